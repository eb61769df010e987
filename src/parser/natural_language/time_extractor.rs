//! Time-of-day and zone extraction for natural language date expressions
//!
//! Pulls a single clock time ("3pm", "10:30 AM", "15:00", "noon") and an
//! optional trailing zone ("PST", "UTC", "+08:00") out of an expression and
//! hands the rest back for date parsing.

use chrono::{FixedOffset, NaiveTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_AMPM_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("valid regex"));

static RE_24H_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid regex"));

static RE_TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(noon|midday|midnight|morning|afternoon|evening|night)\b").expect("valid regex")
});

static RE_NUMERIC_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*([+-])(\d{2}):?(\d{2})$").expect("valid regex"));

static RE_NAMED_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(.*?)\s*\b(utc|gmt|pst|pdt|mst|mdt|cst|cdt|est|edt|bst|cet|cest|ist|sgt|jst|aest|aedt)$",
    )
    .expect("valid regex")
});

static RE_ZULU: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*\d)\s*z$").expect("valid regex"));

/// Outcome of looking for a clock time in an expression.
#[derive(Debug, PartialEq, Eq)]
pub enum TimeMatch {
    /// No time mentioned; the expression is returned unchanged.
    Absent,
    /// A valid time; `rest` is the expression with the time removed.
    Found { time: NaiveTime, rest: String },
    /// Something that looks like a time but is not one ("13pm", "25:00").
    Invalid,
}

/// Convert 12-hour time to 24-hour format
pub fn convert_to_24_hour(hour: u32, minute: u32, meridiem: &str) -> Option<(u32, u32)> {
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let hour_24 = match (hour, meridiem) {
        (12, "am") => 0,
        (h, "am") => h,
        (12, "pm") => 12,
        (h, "pm") => h + 12,
        _ => return None,
    };
    Some((hour_24, minute))
}

/// Find the first clock time in `text` (already lowercased).
pub fn extract_time(text: &str) -> TimeMatch {
    if let Some(caps) = RE_AMPM_TIME.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let minute: u32 = caps
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse().ok())
            .unwrap_or(u32::MAX);
        let Some((hour_24, minute)) = convert_to_24_hour(hour, minute, &caps[3]) else {
            debug!("Rejected 12-hour time '{}'", &caps[0]);
            return TimeMatch::Invalid;
        };
        return found(text, caps.get(0).map(|m| m.range()), hour_24, minute);
    }

    if let Some(caps) = RE_24H_TIME.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let minute: u32 = caps[2].parse().unwrap_or(u32::MAX);
        if hour > 23 || minute > 59 {
            debug!("Rejected 24-hour time '{}'", &caps[0]);
            return TimeMatch::Invalid;
        }
        return found(text, caps.get(0).map(|m| m.range()), hour, minute);
    }

    if let Some(caps) = RE_TIME_OF_DAY.captures(text) {
        let (hour, minute) = match &caps[1] {
            "noon" | "midday" => (12, 0),
            "midnight" => (0, 0),
            "morning" => (9, 0),
            "afternoon" => (14, 0),
            "evening" => (19, 0),
            _ => (20, 0),
        };
        return found(text, caps.get(0).map(|m| m.range()), hour, minute);
    }

    TimeMatch::Absent
}

fn found(text: &str, span: Option<std::ops::Range<usize>>, hour: u32, minute: u32) -> TimeMatch {
    let (Some(span), Some(time)) = (span, NaiveTime::from_hms_opt(hour, minute, 0)) else {
        return TimeMatch::Invalid;
    };
    let rest = format!("{} {}", &text[..span.start], &text[span.end..]);
    TimeMatch::Found {
        time,
        rest: collapse_whitespace(&rest),
    }
}

/// Split a trailing zone designator off `text` (already lowercased).
///
/// Returns the remaining text and the zone's fixed offset, if any.
pub fn split_zone(text: &str) -> (String, Option<FixedOffset>) {
    if let Some(caps) = RE_NUMERIC_OFFSET.captures(text) {
        let hours: i32 = caps[3].parse().unwrap_or(i32::MAX);
        let minutes: i32 = caps[4].parse().unwrap_or(i32::MAX);
        if hours <= 14 && minutes < 60 && !caps[1].trim().is_empty() {
            let seconds = (hours * 3600 + minutes * 60) * if &caps[2] == "-" { -1 } else { 1 };
            if let Some(offset) = FixedOffset::east_opt(seconds) {
                return (caps[1].trim().to_string(), Some(offset));
            }
        }
    }

    if let Some(caps) = RE_NAMED_ZONE.captures(text) {
        if let Some(offset) = abbreviation_offset(&caps[2]) {
            return (caps[1].trim().to_string(), Some(offset));
        }
    }

    if let Some(caps) = RE_ZULU.captures(text) {
        return (caps[1].trim().to_string(), FixedOffset::east_opt(0));
    }

    (text.to_string(), None)
}

/// Fixed UTC offsets for the zone abbreviations we accept.
fn abbreviation_offset(abbreviation: &str) -> Option<FixedOffset> {
    let hours_x2 = match abbreviation {
        "utc" | "gmt" => 0,
        "pst" => -16,
        "pdt" | "mst" => -14,
        "mdt" | "cst" => -12,
        "cdt" | "est" => -10,
        "edt" => -8,
        "bst" | "cet" => 2,
        "cest" => 4,
        "ist" => 11,
        "sgt" => 16,
        "jst" => 18,
        "aest" => 20,
        "aedt" => 22,
        _ => return None,
    };
    FixedOffset::east_opt(hours_x2 * 1800)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
