//! Event types shared by the parser, the batch applier and the calendar adapter.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Default length of an event created from a command line.
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 120;

/// A title plus a timezone-aware start and end, derived from one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    title: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl ParsedEvent {
    /// Build an event lasting `duration` from `start`.
    ///
    /// Returns `None` when the duration is not positive or the end overflows.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        duration: Duration,
    ) -> Option<Self> {
        if duration <= Duration::zero() {
            return None;
        }
        let end = start.checked_add_signed(duration)?;
        Some(Self {
            title: title.into(),
            start,
            end,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Express the event as a creation request in `zone`.
    ///
    /// Start and end become local wall-clock times of `zone`, so the
    /// timestamps and the zone name sent to the calendar always agree.
    pub fn to_new_event(&self, description: &str, zone: Tz) -> NewEvent {
        NewEvent {
            summary: self.title.clone(),
            description: description.to_string(),
            start: self.start.with_timezone(&zone).naive_local(),
            end: self.end.with_timezone(&zone).naive_local(),
            time_zone: zone,
        }
    }
}

/// Creation request handed to a [`crate::calendar::CalendarService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: Tz,
}

/// Start of an event as reported by the remote calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    DateTime(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

/// An event owned by the remote calendar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: String,
    pub start: EventStart,
    pub html_link: Option<String>,
}

/// Half-open listing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The `days` days following `now`, or `None` if the end is not representable.
    pub fn next_days(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let span = Duration::try_days(i64::from(days))?;
        let end = now.checked_add_signed(span)?;
        Some(Self { start: now, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn singapore_start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 15, 0, 0)
            .unwrap()
    }

    #[test]
    fn end_is_start_plus_duration() {
        let event = ParsedEvent::new("Dentist", singapore_start(), Duration::hours(2)).unwrap();
        assert_eq!(event.end().to_rfc3339(), "2025-03-01T17:00:00+08:00");
        assert_eq!(event.duration(), Duration::hours(2));
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(ParsedEvent::new("x", singapore_start(), Duration::zero()).is_none());
        assert!(ParsedEvent::new("x", singapore_start(), Duration::minutes(-5)).is_none());
    }

    #[test]
    fn new_event_uses_wall_clock_of_target_zone() {
        let event = ParsedEvent::new("Call", singapore_start(), Duration::hours(2)).unwrap();
        let request = event.to_new_event("Event added via app", chrono_tz::Europe::London);

        assert_eq!(request.start.to_string(), "2025-03-01 07:00:00");
        assert_eq!(request.end.to_string(), "2025-03-01 09:00:00");
        assert_eq!(request.time_zone.name(), "Europe/London");
        assert_eq!(request.summary, "Call");
    }

    #[test]
    fn next_days_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let range = TimeRange::next_days(now, 7).unwrap();
        assert_eq!(range.start, now);
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap());
    }

    #[test]
    fn next_days_past_the_calendar_end_is_none() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(TimeRange::next_days(now, u32::MAX), None);
    }
}
