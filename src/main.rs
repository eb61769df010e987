use anyhow::Result;
use clap::Parser;
use eventline::cli::Cli;
use log::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    eventline::init_logger(cli.verbose);

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    eventline::run(cli).await
}
