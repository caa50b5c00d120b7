//! Command-line definition for letterlabctl.

use clap::{Parser, Subcommand};
use letterlab_common::{ArcadeGame, MiniGame, StarField};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "letterlabctl")]
#[command(about = "Inspect and maintain Letterlab learning progress", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $LETTERLAB_CONFIG or ~/.config/letterlab/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Progress database, overrides the config file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the progress report
    Report {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one letter's record
    Show {
        letter: String,
        #[arg(long)]
        json: bool,
    },

    /// Award stars for a skill (never lowers a rating)
    Award {
        letter: String,
        /// Stored field name, e.g. ucStars or pictureStars
        field: StarField,
        #[arg(allow_negative_numbers = true)]
        stars: i64,
    },

    /// Record a confusion score measurement (0-100)
    Confusion {
        letter: String,
        #[arg(allow_negative_numbers = true)]
        score: f64,
        /// Overwrite the score without logging it to history
        #[arg(long)]
        no_history: bool,
    },

    /// Record a mini-game score for a letter (kept only if a new best)
    Score {
        letter: String,
        game: MiniGame,
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },

    /// Add play time to a letter
    Time {
        letter: String,
        #[arg(allow_negative_numbers = true)]
        millis: i64,
    },

    /// Log a confusion-pair drill result
    Pair {
        /// Pair of letters, e.g. b/d
        pair: String,
        #[arg(long, default_value_t = 0)]
        correct: u64,
        #[arg(long, default_value_t = 0)]
        wrong: u64,
    },

    /// List the weakest confusion pairs
    Pairs {
        /// Number of pairs (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show or update the arcade record
    Arcade {
        #[command(subcommand)]
        action: Option<ArcadeAction>,
        #[arg(long)]
        json: bool,
    },

    /// Reset one letter, or every letter with --all
    Reset {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        letter: Option<String>,
        #[arg(long)]
        all: bool,
    },

    /// Fold the legacy monster high score into a letter
    Migrate { letter: String },

    /// Write a default config file
    InitConfig {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ArcadeAction {
    /// Submit a score (kept only if a new best)
    High {
        game: ArcadeGame,
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },
    /// Submit a star rating (kept only if better)
    Stars {
        game: ArcadeGame,
        #[arg(allow_negative_numbers = true)]
        stars: i64,
    },
    /// Add collected stickers
    Stickers { count: u64 },
}
