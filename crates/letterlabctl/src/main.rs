//! letterlabctl - inspect and maintain Letterlab learning progress.

use anyhow::Result;
use clap::Parser;
use letterlab_common::Config;
use letterlabctl::cli::Cli;
use letterlabctl::{commands, display, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = Config::load(cli.config.as_deref())?;
    logging::init(&config.logging.level);
    source.log();

    if let Err(e) = commands::run(cli, config).await {
        display::display_error(commands::error_code(&e), &format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
