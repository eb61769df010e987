use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Eventline - type events as plain lines, get them on your calendar
#[derive(Debug, Parser)]
#[command(name = "eventline")]
#[command(
    about = "Turn lines like \"next Tuesday 3pm, Dentist\" into calendar events",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive mode)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create events from lines of "<date/time>, <title>"
    #[command(alias = "create")]
    Add {
        /// File with one command per line (stdin when omitted or "-")
        file: Option<PathBuf>,
    },

    /// Summarize upcoming events
    #[command(alias = "week")]
    Upcoming {
        /// Number of days to look ahead (defaults to the configured value)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: Option<u32>,
    },

    /// Parse command lines without contacting the calendar
    Parse {
        /// Lines such as "March 1 2025 3pm, Dentist"
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
