//! Natural language date/time parsing
//!
//! Turns human phrasings such as "next Tuesday 3pm", "March 5 2025 10:30 AM"
//! or "tomorrow morning" into a timestamp, relative to an injected "now".

pub mod time_extractor;

use crate::parser::traits::{DateTimeParser, HumanDateTime};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use time_extractor::{collapse_whitespace, extract_time, split_zone, TimeMatch};

/// Words that carry no date information ("at 3pm", "on the 5th of March").
const FILLER_WORDS: &[&str] = &["at", "on", "the", "of"];

static RE_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(this|next)\s+)?",
        r"(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(?:day|sday|nesday|rsday|urday)?$"
    ))
    .expect("valid regex")
});

static RE_RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^in\s+(\d+|a|an|one|two|three|four|five|six|seven|eight|nine|ten)\s+",
        r"(minutes?|mins?|hours?|hrs?|days?|weeks?)$"
    ))
    .expect("valid regex")
});

static RE_MONTH_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s+(\d{4}))?$").expect("valid regex")
});

static RE_DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?(?:\s+(\d{4}))?$").expect("valid regex")
});

static RE_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));

static RE_SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{4}))?$").expect("valid regex"));

/// Regex and calendar-arithmetic implementation of [`DateTimeParser`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalLanguageParser;

impl NaturalLanguageParser {
    pub fn new() -> Self {
        Self
    }
}

/// What the date half of an expression resolved to.
enum DateExpr {
    /// A calendar day; `default_time` applies when no clock time was given.
    Day { date: NaiveDate, default_time: NaiveTime },
    /// An exact offset from now ("in 2 hours"); cannot be combined with a time.
    Instant(DateTime<Utc>),
}

impl DateTimeParser for NaturalLanguageParser {
    fn parse_datetime(&self, text: &str, now: DateTime<Utc>, zone: Tz) -> Option<HumanDateTime> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        debug!("Parsing date expression '{}'", normalized);

        let (without_zone, offset) = split_zone(&normalized);
        let words: Vec<&str> = without_zone
            .split_whitespace()
            .filter(|word| !FILLER_WORDS.contains(word))
            .collect();
        let expression = words.join(" ");

        let (time, date_text) = match extract_time(&expression) {
            TimeMatch::Found { time, rest } => (Some(time), rest),
            TimeMatch::Absent => (None, expression),
            TimeMatch::Invalid => return None,
        };

        let today = now.with_timezone(&zone).date_naive();
        let date = if date_text.is_empty() {
            // A bare time means today; nothing at all is not a date.
            if time.is_none() {
                return None;
            }
            DateExpr::Day {
                date: today,
                default_time: midnight()?,
            }
        } else {
            parse_date(&date_text, today, now)?
        };

        match date {
            DateExpr::Instant(instant) => {
                if time.is_some() {
                    return None;
                }
                let local = instant.with_timezone(&zone);
                Some(HumanDateTime::Zoned(local.fixed_offset()))
            }
            DateExpr::Day { date, default_time } => {
                let naive = date.and_time(time.unwrap_or(default_time));
                match offset {
                    Some(offset) => offset
                        .from_local_datetime(&naive)
                        .single()
                        .map(HumanDateTime::Zoned),
                    None => Some(HumanDateTime::Naive(naive)),
                }
            }
        }
    }
}

/// Lowercase, drop dotted meridiems ("p.m.") and squeeze whitespace.
fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase().replace("a.m.", "am").replace("p.m.", "pm");
    collapse_whitespace(&lowered)
}

fn parse_date(text: &str, today: NaiveDate, now: DateTime<Utc>) -> Option<DateExpr> {
    let start_of_day = midnight()?;
    let day = |date: NaiveDate| {
        Some(DateExpr::Day {
            date,
            default_time: start_of_day,
        })
    };

    match text {
        "today" => return day(today),
        "tomorrow" => return day(today.succ_opt()?),
        "yesterday" => return day(today.pred_opt()?),
        "tonight" => {
            return Some(DateExpr::Day {
                date: today,
                default_time: NaiveTime::from_hms_opt(20, 0, 0)?,
            });
        }
        _ => {}
    }

    if let Some(caps) = RE_WEEKDAY.captures(text) {
        let target = weekday_from_name(&caps[2])?;
        let ahead = days_until(today.weekday(), target);
        let ahead = match caps.get(1).map(|m| m.as_str()) {
            Some("next") if ahead == 0 => 7,
            _ => ahead,
        };
        return day(today + Duration::days(ahead));
    }

    if let Some(caps) = RE_RELATIVE.captures(text) {
        let amount = number_from_word(&caps[1])?;
        let unit = &caps[2];
        if unit.starts_with('d') {
            return day(today + Duration::days(amount));
        }
        if unit.starts_with('w') {
            return day(today + Duration::weeks(amount));
        }
        let delta = if unit.starts_with('h') {
            Duration::hours(amount)
        } else {
            Duration::minutes(amount)
        };
        return now.checked_add_signed(delta).map(DateExpr::Instant);
    }

    if let Some(caps) = RE_ISO_DATE.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        return day(date);
    }

    if let Some(caps) = RE_SLASH_DATE.captures(text) {
        let year = caps.get(3).map_or_else(|| today.year().to_string(), |m| m.as_str().to_string());
        return day(ymd(&year, &caps[1], &caps[2])?);
    }

    if let Some(caps) = RE_MONTH_FIRST.captures(text) {
        if let Some(month) = month_from_name(&caps[1]) {
            let date = with_year(caps.get(3).map(|m| m.as_str()), today, month, &caps[2])?;
            return day(date);
        }
    }

    if let Some(caps) = RE_DAY_FIRST.captures(text) {
        if let Some(month) = month_from_name(&caps[2]) {
            let date = with_year(caps.get(3).map(|m| m.as_str()), today, month, &caps[1])?;
            return day(date);
        }
    }

    debug!("No date pattern matched '{}'", text);
    None
}

fn midnight() -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(0, 0, 0)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn with_year(year: Option<&str>, today: NaiveDate, month: u32, day: &str) -> Option<NaiveDate> {
    let year = match year {
        Some(year) => year.parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day.parse().ok()?)
}

/// Days from `from` forward to the next `to`, zero when they are the same day.
fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let to = i64::from(to.num_days_from_monday());
    (to - from).rem_euclid(7)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "mon" => Some(Weekday::Mon),
        "tue" | "tues" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

fn number_from_word(word: &str) -> Option<i64> {
    let number = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => return digits.parse().ok().filter(|n| *n <= 100_000),
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const SINGAPORE: Tz = chrono_tz::Asia::Singapore;

    /// Wednesday 2025-02-26 10:00 in Singapore.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 26, 2, 0, 0).unwrap()
    }

    fn naive(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    fn parse(text: &str) -> Option<HumanDateTime> {
        NaturalLanguageParser::new().parse_datetime(text, now(), SINGAPORE)
    }

    #[test_case("March 1 2025 3pm", "2025-03-01 15:00"; "month day year time")]
    #[test_case("March 5 2025 10:30 AM", "2025-03-05 10:30"; "spaced meridiem")]
    #[test_case("1st March 2025 at 9am", "2025-03-01 09:00"; "day first with ordinal")]
    #[test_case("Mar 3", "2025-03-03 00:00"; "abbreviated month without year")]
    #[test_case("2025-04-10 18:45", "2025-04-10 18:45"; "iso date")]
    #[test_case("04/10/2025 6pm", "2025-04-10 18:00"; "us slash date")]
    #[test_case("3pm", "2025-02-26 15:00"; "bare time is today")]
    #[test_case("tomorrow at 10:30 a.m.", "2025-02-27 10:30"; "tomorrow dotted meridiem")]
    #[test_case("tomorrow morning", "2025-02-27 09:00"; "tomorrow morning")]
    #[test_case("tonight", "2025-02-26 20:00"; "tonight")]
    #[test_case("friday 3pm", "2025-02-28 15:00"; "coming weekday")]
    #[test_case("wednesday noon", "2025-02-26 12:00"; "same weekday counts")]
    #[test_case("next wednesday 8am", "2025-03-05 08:00"; "next same weekday skips a week")]
    #[test_case("next Tuesday 3pm", "2025-03-04 15:00"; "next tuesday")]
    #[test_case("in 3 days", "2025-03-01 00:00"; "in days")]
    #[test_case("in a week 14:00", "2025-03-05 14:00"; "in a week with time")]
    #[test_case("on the 5th of march at 7pm", "2025-03-05 19:00"; "filler words")]
    fn parses_local_phrasings(input: &str, expected: &str) {
        assert_eq!(parse(input), Some(HumanDateTime::Naive(naive(expected))), "input: {}", input);
    }

    #[test]
    fn explicit_zone_is_kept() {
        let parsed = parse("March 1 2025 3pm PST").unwrap();
        let expected = FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 15, 0, 0)
            .unwrap();
        assert_eq!(parsed, HumanDateTime::Zoned(expected));
    }

    #[test]
    fn relative_hours_are_exact_instants() {
        let parsed = parse("in 2 hours").unwrap();
        match parsed {
            HumanDateTime::Zoned(at) => {
                assert_eq!(at.to_rfc3339(), "2025-02-26T12:00:00+08:00");
            }
            other => panic!("expected zoned instant, got {:?}", other),
        }
        assert_eq!(parse("in 2 hours 3pm"), None);
    }

    #[test_case(""; "empty")]
    #[test_case("whenever"; "unknown word")]
    #[test_case("February 30 2025"; "impossible date")]
    #[test_case("march 1 2025 13pm"; "impossible time")]
    #[test_case("march 1 2025 3pm 4pm"; "two times")]
    #[test_case("smarch 1"; "unknown month")]
    fn rejects_unparseable_text(input: &str) {
        assert_eq!(parse(input), None);
    }
}
