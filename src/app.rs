use crate::batch::BatchApplier;
use crate::calendar::{CalendarService, GoogleCalendarClient};
use crate::cli::{Commands, ConfigActions};
use crate::clock::{Clock, SystemClock};
use crate::config::{get_config_path, Config};
use crate::parser::{CommandParser, NaturalLanguageParser};
use crate::summary::summarize_upcoming;
use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub struct Application {
    config_path: PathBuf,
    clock: SystemClock,
}

impl Application {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => get_config_path()?,
        };
        Ok(Self {
            config_path,
            clock: SystemClock,
        })
    }

    pub async fn run(&self, command: Option<Commands>) -> Result<()> {
        match command {
            Some(Commands::Config { action }) => self.config_command(action),
            Some(Commands::Add { file }) => self.add_from(&self.config()?, file.as_deref()).await,
            Some(Commands::Upcoming { days }) => self.upcoming(&self.config()?, days).await,
            Some(Commands::Parse { lines }) => self.parse_lines(&self.config()?, &lines),
            None => self.run_interactive(&self.config()?).await,
        }
    }

    /// Validated configuration, read fresh for the command being run.
    fn config(&self) -> Result<Config> {
        Config::load(Some(&self.config_path))
    }

    fn batch_applier(config: &Config) -> Result<BatchApplier> {
        let parser = CommandParser::new(
            config.time_zone()?,
            config.event_duration()?,
            Box::new(NaturalLanguageParser::new()),
        )?;
        Ok(BatchApplier::new(parser, config.calendar.description.clone()))
    }

    /// The one authenticated client used for the lifetime of the process.
    fn calendar_client(config: &Config) -> Result<GoogleCalendarClient> {
        let token = config.access_token()?;
        GoogleCalendarClient::new(&config.google, &config.calendar.calendar_id, token)
    }

    async fn add_from(&self, config: &Config, file: Option<&Path>) -> Result<()> {
        let text = match file {
            Some(path) if path != Path::new("-") => fs::read_to_string(path)
                .with_context(|| format!("Failed to read commands from {}", path.display()))?,
            _ => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read commands from stdin")?;
                buffer
            }
        };

        let applier = Self::batch_applier(config)?;
        let calendar = Self::calendar_client(config)?;
        let result = applier.apply(&text, &calendar, &self.clock).await;
        println!("{}", result);
        Ok(())
    }

    async fn upcoming(&self, config: &Config, days: Option<u32>) -> Result<()> {
        let calendar = Self::calendar_client(config)?;
        let days = days.unwrap_or(config.calendar.upcoming_days);
        println!("{}", upcoming_message(days, &calendar, &self.clock).await);
        Ok(())
    }

    fn parse_lines(&self, config: &Config, lines: &[String]) -> Result<()> {
        let applier = Self::batch_applier(config)?;
        let now = self.clock.now();
        for line in lines {
            match applier.parser().parse(line, now) {
                Ok(event) => println!(
                    "{} | {} -> {}",
                    event.title(),
                    event.start().to_rfc3339(),
                    event.end().to_rfc3339()
                ),
                Err(e) => println!("Error with event: {} - {}", line, e),
            }
        }
        Ok(())
    }

    fn config_command(&self, action: ConfigActions) -> Result<()> {
        match action {
            ConfigActions::Show => {
                let config = Config::read(Some(&self.config_path))?;
                if let Err(e) = config.validate() {
                    log::warn!("{} is not valid: {}", self.config_path.display(), e);
                }
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigActions::Path => {
                println!("{}", self.config_path.display());
            }
            ConfigActions::Init { force } => {
                if self.config_path.exists() && !force {
                    return Err(anyhow!(
                        "{} already exists, use --force to overwrite it",
                        self.config_path.display()
                    ));
                }
                Config::default().save(&self.config_path)?;
                println!(
                    "Wrote default configuration to {}",
                    self.config_path.display()
                );
            }
        }
        Ok(())
    }

    async fn run_interactive(&self, config: &Config) -> Result<()> {
        log::info!("Starting Eventline interactive mode");
        let applier = Self::batch_applier(config)?;
        let calendar = Self::calendar_client(config)?;

        let mut rl = DefaultEditor::new()?;
        println!("Enter events like: March 1 2025 3pm, Dentist");
        println!("An empty line adds the queued events. :week shows the upcoming days.");
        println!(":clear drops the queue, exit quits.");

        let mut pending: Vec<String> = Vec::new();
        let prompt = "eventline> ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    match trimmed {
                        "exit" | "quit" => break,
                        ":week" | ":upcoming" => {
                            let days = config.calendar.upcoming_days;
                            println!("{}", upcoming_message(days, &calendar, &self.clock).await);
                        }
                        ":clear" => {
                            println!("Dropped {} queued line(s)", pending.len());
                            pending.clear();
                        }
                        "" if pending.is_empty() => {}
                        "" => {
                            let text = pending.join("\n");
                            pending.clear();
                            let result = applier.apply(&text, &calendar, &self.clock).await;
                            println!("{}", result);
                        }
                        _ => {
                            let _ = rl.add_history_entry(trimmed);
                            pending.push(trimmed.to_string());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        if !pending.is_empty() {
            println!(
                "Discarded {} queued line(s) that were never submitted",
                pending.len()
            );
        }
        Ok(())
    }
}

/// Summary text, or a single failure message when listing fails.
async fn upcoming_message(days: u32, calendar: &dyn CalendarService, clock: &dyn Clock) -> String {
    match summarize_upcoming(days, calendar, clock).await {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Failed to list events: {}", e);
            format!("Could not fetch events: {}", e)
        }
    }
}
