//! Batch event creation
//!
//! Applies every line of a pasted block of commands independently: one bad
//! line is recorded and skipped, it never stops the lines after it.

use crate::calendar::CalendarService;
use crate::clock::Clock;
use crate::parser::CommandParser;
use crate::parser::utils::command_lines;
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::fmt;

/// A command line that did not become an event, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub command: String,
    pub message: String,
}

/// Outcome of one batch: how many events were created and which lines failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    success_count: usize,
    errors: Vec<LineError>,
}

impl BatchResult {
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Failed lines in input order.
    pub fn errors(&self) -> &[LineError] {
        &self.errors
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "Successfully added {} events!", self.success_count);
        }
        let errors: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("Error with event: {} - {}", e.command, e.message))
            .collect();
        write!(
            f,
            "{} events added. Errors: {}",
            self.success_count,
            errors.join(", ")
        )
    }
}

/// Parses command lines and creates one remote event per valid line.
#[derive(Debug)]
pub struct BatchApplier {
    parser: CommandParser,
    /// Zone the remote calendar receives wall-clock times in
    calendar_zone: Tz,
    description: String,
}

impl BatchApplier {
    pub fn new(parser: CommandParser, description: impl Into<String>) -> Self {
        let calendar_zone = parser.zone();
        Self {
            parser,
            calendar_zone,
            description: description.into(),
        }
    }

    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Process every non-blank line of `text` in order.
    ///
    /// Blank lines are skipped without being reported.
    pub async fn apply(
        &self,
        text: &str,
        calendar: &dyn CalendarService,
        clock: &dyn Clock,
    ) -> BatchResult {
        let now = clock.now();
        let mut result = BatchResult::default();

        for command in command_lines(text) {
            debug!("Processing command: '{}'", command);
            let parsed = match self.parser.parse(command, now) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Could not parse '{}': {}", command, e);
                    result.errors.push(LineError {
                        command: command.to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let request = parsed.to_new_event(&self.description, self.calendar_zone);
            match calendar.create_event(&request).await {
                Ok(created) => {
                    debug!("Created remote event {} for '{}'", created.id, command);
                    result.success_count += 1;
                }
                Err(e) => {
                    warn!("Failed to create event for '{}': {}", command, e);
                    result.errors.push(LineError {
                        command: command.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!("Batch finished: {} created, {} failed", result.success_count, result.errors.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line_error(command: &str, message: &str) -> LineError {
        LineError {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn clean_result_message() {
        let result = BatchResult {
            success_count: 3,
            errors: Vec::new(),
        };
        assert!(result.is_clean());
        assert_eq!(result.to_string(), "Successfully added 3 events!");
    }

    #[test]
    fn failed_lines_are_listed_in_message() {
        let result = BatchResult {
            success_count: 1,
            errors: vec![
                line_error("Dentist", "no comma"),
                line_error("someday, Gym", "bad date"),
            ],
        };
        assert_eq!(
            result.to_string(),
            "1 events added. Errors: Error with event: Dentist - no comma, \
             Error with event: someday, Gym - bad date"
        );
    }
}
