//! Remote calendar access
//!
//! [`CalendarService`] is the seam between the batch applier / summary and a
//! real calendar. [`GoogleCalendarClient`] talks to Google Calendar; tests use
//! in-memory implementations.

use crate::event::{NewEvent, RemoteEvent, TimeRange};
use async_trait::async_trait;

mod google;

pub use google::GoogleCalendarClient;

/// Custom error type for calendar operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("Request to calendar service failed: {0}")]
    Request(String),
    #[error("Calendar service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response from calendar service: {0}")]
    Decode(String),
    #[error("Cannot list events for the next {0} days")]
    InvalidRange(u32),
}

/// Operations the rest of the crate needs from a remote calendar.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Create one event and return it as stored by the service.
    async fn create_event(&self, event: &NewEvent) -> Result<RemoteEvent, CalendarError>;

    /// Events overlapping `range`, ordered by start time, recurring events expanded.
    async fn list_events(&self, range: &TimeRange) -> Result<Vec<RemoteEvent>, CalendarError>;
}
