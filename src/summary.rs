//! One-sentence summary of upcoming events.

use crate::calendar::{CalendarError, CalendarService};
use crate::clock::Clock;
use crate::event::{EventStart, RemoteEvent, TimeRange};
use log::debug;

/// Number of days covered by the "next week" summary.
pub const WEEK_DAYS: u32 = 7;

/// Longest look-ahead a summary accepts.
pub const MAX_UPCOMING_DAYS: u32 = 366;

/// Render a start time as "March 01, 2025 at 03:00 PM" in the event's own offset.
pub fn format_event_date(start: &EventStart) -> String {
    match start {
        EventStart::DateTime(at) => at.format("%B %d, %Y at %I:%M %p").to_string(),
        EventStart::AllDay(date) => date.format("%B %d, %Y (all day)").to_string(),
    }
}

/// List the events of the next `days` days and describe them in one sentence.
///
/// Events appear in the order the calendar returned them. `days` must be in
/// `1..=MAX_UPCOMING_DAYS`.
pub async fn summarize_upcoming(
    days: u32,
    calendar: &dyn CalendarService,
    clock: &dyn Clock,
) -> Result<String, CalendarError> {
    if !(1..=MAX_UPCOMING_DAYS).contains(&days) {
        return Err(CalendarError::InvalidRange(days));
    }
    let range = TimeRange::next_days(clock.now(), days)
        .ok_or(CalendarError::InvalidRange(days))?;
    debug!("Summarizing events from {} to {}", range.start, range.end);

    let events = calendar.list_events(&range).await?;
    Ok(render_summary(days, &events))
}

pub fn render_summary(days: u32, events: &[RemoteEvent]) -> String {
    if events.is_empty() {
        return if days == WEEK_DAYS {
            "You have no events next week.".to_string()
        } else {
            format!("You have no events in the next {} days.", days)
        };
    }

    let period = if days == WEEK_DAYS {
        "Next week".to_string()
    } else {
        format!("In the next {} days", days)
    };

    let entries: Vec<String> = events
        .iter()
        .map(|event| {
            let title = if event.summary.trim().is_empty() {
                "(no title)"
            } else {
                event.summary.as_str()
            };
            format!("{} on {}", title, format_event_date(&event.start))
        })
        .collect();

    format!(
        "{}, you have {} event(s): {}",
        period,
        events.len(),
        entries.join("; ")
    )
}
