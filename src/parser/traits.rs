//! Parser traits module
//!
//! The date/time capability the command parser depends on. Implementations
//! must be deterministic given `now`, so tests can substitute stubs.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Debug;

/// Result of interpreting a human date/time phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanDateTime {
    /// The phrase named its own zone or was an exact offset from now
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time with no zone information
    Naive(NaiveDateTime),
}

/// Interprets free-text date/time expressions such as "next Tuesday 3pm".
pub trait DateTimeParser: Debug + Send + Sync {
    /// Parse `text` relative to `now`.
    ///
    /// `zone` is the user's zone, used to resolve words like "today" and
    /// "tomorrow"; it must not be attached to the result. Returns `None`
    /// when the text is not a recognizable date/time.
    fn parse_datetime(&self, text: &str, now: DateTime<Utc>, zone: Tz) -> Option<HumanDateTime>;
}
