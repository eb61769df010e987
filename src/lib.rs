pub mod app;
pub mod batch;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod config;
pub mod event;
pub mod parser;
pub mod summary;

use anyhow::Result;
use env_logger::Env;
use log::*;

pub async fn run(cli: cli::Cli) -> Result<()> {
    let app = app::Application::new(cli.config)?;
    debug!("Initialized Eventline application");
    app.run(cli.command).await
}

/// Log to stderr so stdout carries only status messages.
///
/// `EVENTLINE_LOG` sets the filter; `verbose` forces debug output.
pub fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::new().filter_or("EVENTLINE_LOG", "info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use batch::{BatchApplier, BatchResult, LineError};
pub use calendar::{CalendarError, CalendarService, GoogleCalendarClient};
pub use config::Config;
pub use event::{EventStart, NewEvent, ParsedEvent, RemoteEvent, TimeRange};
pub use parser::{CommandParser, ParseError};
