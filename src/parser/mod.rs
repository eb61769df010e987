//! Eventline parser module
//!
//! Turns one `<date/time>, <title>` command line into a [`ParsedEvent`].

pub mod natural_language;
pub mod traits;
pub mod utils;

use crate::event::{ParsedEvent, DEFAULT_EVENT_DURATION_MINUTES};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
// Re-export so callers can write parser::DateTimeParser
pub use natural_language::NaturalLanguageParser;
pub use traits::{DateTimeParser, HumanDateTime};

/// Why a single command line could not become an event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Expected '<date and time>, <title>' but the line has no comma")]
    MalformedCommand,
    #[error("Could not parse date and time from '{0}'")]
    UnrecognizedDateTime(String),
    #[error("Event title is empty")]
    EmptyTitle,
    #[error("Event time is out of range")]
    OutOfRange,
}

/// Parser for `<date/time>, <title>` command lines
#[derive(Debug)]
pub struct CommandParser {
    zone: Tz,
    duration: Duration,
    datetime_parser: Box<dyn DateTimeParser>,
}

impl CommandParser {
    /// Create a parser that attaches `zone` to zone-less times and gives every
    /// event the same `duration`.
    pub fn new(
        zone: Tz,
        duration: Duration,
        datetime_parser: Box<dyn DateTimeParser>,
    ) -> Result<Self> {
        if duration <= Duration::zero() {
            return Err(anyhow!(
                "Event duration must be positive, got {} minutes",
                duration.num_minutes()
            ));
        }
        Ok(Self {
            zone,
            duration,
            datetime_parser,
        })
    }

    /// Natural language parsing with the default two hour duration.
    pub fn with_defaults(zone: Tz) -> Self {
        Self {
            zone,
            duration: Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES),
            datetime_parser: Box::new(NaturalLanguageParser::new()),
        }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Parse one command line relative to `now`.
    ///
    /// Only the first comma separates the date from the title, so titles may
    /// contain commas themselves.
    pub fn parse(&self, line: &str, now: DateTime<Utc>) -> Result<ParsedEvent, ParseError> {
        let line = utils::sanitize_user_input(line);
        let (date_part, title) = line
            .split_once(',')
            .ok_or(ParseError::MalformedCommand)?;
        let (date_part, title) = (date_part.trim(), title.trim());
        debug!("Split command into date '{}' and title '{}'", date_part, title);

        if title.is_empty() {
            return Err(ParseError::EmptyTitle);
        }

        let unrecognized = || ParseError::UnrecognizedDateTime(date_part.to_string());
        if date_part.is_empty() {
            return Err(unrecognized());
        }

        let start = match self.datetime_parser.parse_datetime(date_part, now, self.zone) {
            Some(HumanDateTime::Zoned(start)) => start,
            Some(HumanDateTime::Naive(naive)) => {
                // Ambiguous wall-clock times take the earlier instant; skipped ones fail.
                self.zone
                    .from_local_datetime(&naive)
                    .earliest()
                    .ok_or_else(unrecognized)?
                    .fixed_offset()
            }
            None => return Err(unrecognized()),
        };

        ParsedEvent::new(title, start, self.duration).ok_or(ParseError::OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    /// Returns the same answer for every input.
    #[derive(Debug)]
    struct StubParser(Option<HumanDateTime>);

    impl DateTimeParser for StubParser {
        fn parse_datetime(
            &self,
            _text: &str,
            _now: DateTime<Utc>,
            _zone: Tz,
        ) -> Option<HumanDateTime> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 26, 2, 0, 0).unwrap()
    }

    fn naive(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    fn stub_parser(result: Option<HumanDateTime>) -> CommandParser {
        CommandParser::new(
            chrono_tz::Asia::Singapore,
            Duration::hours(2),
            Box::new(StubParser(result)),
        )
        .unwrap()
    }

    #[test]
    fn dentist_example() {
        let parser = CommandParser::with_defaults(chrono_tz::Asia::Singapore);
        let event = parser.parse("March 1 2025 3pm, Dentist", now()).unwrap();

        assert_eq!(event.title(), "Dentist");
        assert_eq!(event.start().to_rfc3339(), "2025-03-01T15:00:00+08:00");
        assert_eq!(event.end().to_rfc3339(), "2025-03-01T17:00:00+08:00");
    }

    #[test]
    fn no_comma_is_malformed() {
        let parser = stub_parser(Some(HumanDateTime::Naive(naive("2025-03-01 15:00"))));
        assert_eq!(
            parser.parse("Dentist appointment", now()),
            Err(ParseError::MalformedCommand)
        );
    }

    #[test]
    fn title_keeps_later_commas() {
        let parser = stub_parser(Some(HumanDateTime::Naive(naive("2025-03-01 15:00"))));
        let event = parser.parse("tomorrow 3pm,  Lunch with Ann, Bob, and Cy ", now()).unwrap();
        assert_eq!(event.title(), "Lunch with Ann, Bob, and Cy");
    }

    #[test_case("tomorrow 3pm,"; "nothing after comma")]
    #[test_case("tomorrow 3pm,    "; "only spaces after comma")]
    fn empty_title_is_rejected(line: &str) {
        let parser = stub_parser(Some(HumanDateTime::Naive(naive("2025-03-01 15:00"))));
        assert_eq!(parser.parse(line, now()), Err(ParseError::EmptyTitle));
    }

    #[test]
    fn unparseable_date_is_reported_with_its_text() {
        let parser = stub_parser(None);
        assert_eq!(
            parser.parse("someday , Gym", now()),
            Err(ParseError::UnrecognizedDateTime("someday".to_string()))
        );
        assert_eq!(
            parser.parse(", Gym", now()),
            Err(ParseError::UnrecognizedDateTime(String::new()))
        );
    }

    #[test]
    fn naive_times_get_the_default_zone() {
        let parser = stub_parser(Some(HumanDateTime::Naive(naive("2025-07-04 09:30"))));
        let event = parser.parse("whatever, Standup", now()).unwrap();
        assert_eq!(event.start().to_rfc3339(), "2025-07-04T09:30:00+08:00");
    }

    #[test]
    fn zoned_times_are_not_reinterpreted() {
        let zoned = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .unwrap();
        let parser = stub_parser(Some(HumanDateTime::Zoned(zoned)));
        let event = parser.parse("march 1 9am est, Call", now()).unwrap();
        assert_eq!(event.start(), zoned);
        assert_eq!(event.end().to_rfc3339(), "2025-03-01T11:00:00-05:00");
    }

    #[test]
    fn skipped_local_time_is_unrecognized() {
        // 02:30 does not exist in New York on 2025-03-09.
        let parser = CommandParser::new(
            chrono_tz::America::New_York,
            Duration::hours(2),
            Box::new(StubParser(Some(HumanDateTime::Naive(naive("2025-03-09 02:30"))))),
        )
        .unwrap();
        assert!(matches!(
            parser.parse("march 9 2:30am, Ghost", now()),
            Err(ParseError::UnrecognizedDateTime(_))
        ));
    }

    #[test]
    fn repeated_local_time_takes_the_earlier_instant() {
        // 01:30 happens twice in New York on 2025-11-02, first at -04:00.
        let parser = CommandParser::new(
            chrono_tz::America::New_York,
            Duration::hours(1),
            Box::new(StubParser(Some(HumanDateTime::Naive(naive("2025-11-02 01:30"))))),
        )
        .unwrap();

        let event = parser.parse("nov 2 1:30am, Night shift", now()).unwrap();

        assert_eq!(event.start().to_rfc3339(), "2025-11-02T01:30:00-04:00");
        assert_eq!(event.end().to_rfc3339(), "2025-11-02T02:30:00-04:00");
    }

    #[test_case(30; "half hour")]
    #[test_case(120; "two hours")]
    #[test_case(1440; "full day")]
    fn end_minus_start_is_the_configured_duration(minutes: i64) {
        let parser = CommandParser::new(
            chrono_tz::Asia::Singapore,
            Duration::minutes(minutes),
            Box::new(NaturalLanguageParser::new()),
        )
        .unwrap();
        let event = parser.parse("next tuesday 3pm, Review", now()).unwrap();
        assert_eq!(event.end() - event.start(), Duration::minutes(minutes));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let result = CommandParser::new(
            chrono_tz::UTC,
            Duration::zero(),
            Box::new(NaturalLanguageParser::new()),
        );
        assert!(result.is_err());
    }
}
