//! Command dispatch: open the store, run one operation, print the result.

use crate::cli::{ArcadeAction, Cli, Commands};
use crate::display;
use anyhow::{anyhow, Context, Result};
use letterlab_common::{Config, ConfusionScoreOptions, Letterlab, StoreError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Apply `--db`, which beats the config file
pub fn with_db_override(mut config: Config, db: Option<PathBuf>) -> Config {
    if let Some(path) = db {
        config.storage.path = Some(path);
    }
    config
}

/// Tag for a failed command: the store's error code, or `cli`
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .map(StoreError::code)
        .unwrap_or("cli")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if let Commands::InitConfig { path } = &cli.command {
        let path = match path {
            Some(p) => p.clone(),
            None => Config::default_path()
                .ok_or_else(|| anyhow!("No config directory on this system, pass --path"))?,
        };
        Config::save_default(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = with_db_override(config, cli.db);
    debug!("Opening progress store at {:?}", config.storage.location());
    let lab = Letterlab::open(&config)
        .await
        .context("Failed to open progress store")?;

    execute(&lab, cli.command, &config).await
}

/// Run one command against an open store
pub async fn execute(lab: &Letterlab, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Report { json } => {
            let report = lab
                .report()
                .with_weakest_limit(config.report.weakest_pairs)
                .build()
                .await?;
            if json {
                print_json(&report)?;
            } else {
                display::print_report(&report);
            }
        }

        Commands::Show { letter, json } => {
            let progress = lab.letters().get(&letter).await?;
            if json {
                print_json(&progress)?;
            } else {
                display::print_letter(&letter, &progress);
            }
        }

        Commands::Award { letter, field, stars } => {
            let progress = lab.letters().award_stars(&letter, field, stars).await?;
            info!("Awarded {} {} to {}", stars, field, letter);
            println!(
                "{} {} = {}",
                letter.to_uppercase(),
                field,
                display::star_bar(progress.stars(field))
            );
        }

        Commands::Confusion {
            letter,
            score,
            no_history,
        } => {
            let opts = ConfusionScoreOptions {
                append_history: !no_history,
            };
            let progress = lab
                .letters()
                .set_confusion_score(&letter, score, opts)
                .await?;
            println!(
                "{} confusion score = {} ({} in history)",
                letter.to_uppercase(),
                progress.confusion_score,
                progress.confusion_history.len()
            );
        }

        Commands::Score { letter, game, score } => {
            let progress = lab
                .letters()
                .save_game_high_score(&letter, game, score)
                .await?;
            println!(
                "{} {} best = {}",
                letter.to_uppercase(),
                game.name(),
                progress.high_score(game)
            );
        }

        Commands::Time { letter, millis } => {
            let progress = lab.letters().add_time_spent(&letter, millis).await?;
            println!(
                "{} time spent = {} ms",
                letter.to_uppercase(),
                progress.time_spent_ms
            );
        }

        Commands::Pair {
            pair,
            correct,
            wrong,
        } => {
            let p = lab.pairs().add_result(&pair, correct, wrong).await?;
            display::print_pairs(std::slice::from_ref(&p));
        }

        Commands::Pairs { limit } => {
            let limit = limit.unwrap_or(config.report.weakest_pairs);
            let pairs = lab.pairs().get_weakest(limit).await?;
            display::print_pairs(&pairs);
        }

        Commands::Arcade { action, json } => {
            let arcade = match action {
                None => lab.arcade().get().await?,
                Some(ArcadeAction::High { game, score }) => {
                    lab.arcade().set_high(game, score).await?
                }
                Some(ArcadeAction::Stars { game, stars }) => {
                    lab.arcade().award_stars(game, stars).await?
                }
                Some(ArcadeAction::Stickers { count }) => lab.arcade().add_stickers(count).await?,
            };
            if json {
                print_json(&arcade)?;
            } else {
                display::print_arcade(&arcade);
            }
        }

        Commands::Reset { letter, all } => {
            if all {
                lab.letters().clear_all().await?;
                println!("Cleared progress for every letter");
            } else if let Some(letter) = letter {
                lab.letters().reset(&letter).await?;
                println!("Reset {}", letter.to_uppercase());
            }
        }

        Commands::Migrate { letter } => {
            let best = lab.migrate_legacy_monster_high_score(&letter).await?;
            println!("{} monster best = {}", letter.to_uppercase(), best);
        }

        Commands::InitConfig { .. } => {}
    }
    Ok(())
}
