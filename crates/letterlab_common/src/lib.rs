//! Letterlab Common - progress and unlock state for the letter-learning app
//!
//! Per-letter skill stars, confusion measurements, mini-game high scores,
//! confusion-pair accuracy and the global arcade record, all persisted in a
//! flat key-value store, plus the read-only progress report built from them.

pub mod arcade;
pub mod codec;
pub mod config;
pub mod confusion;
pub mod error;
pub mod kv;
pub mod letters;
pub mod migration;
pub mod progress;
pub mod report;

pub use arcade::{ArcadeGame, ArcadeProgress, ArcadeStore};
pub use config::{Config, ConfigSource};
pub use confusion::{ConfusionPairProgress, ConfusionPairStore, PairKey};
pub use error::{Result, StoreError};
pub use kv::{DbLocation, KvStore, MemoryKvStore, SharedKv, SqliteKvStore};
pub use letters::{MiniGame, StarField};
pub use progress::{
    ConfusionScoreOptions, HistoryEntry, LetterEntry, LetterPatch, LetterProgress,
    LetterProgressStore, UnlockState,
};
pub use report::{ConfusionTrend, ProgressReport, ReportBuilder};

use std::sync::Arc;
use tracing::debug;

/// All stores over one shared backend
#[derive(Clone)]
pub struct Letterlab {
    letters: LetterProgressStore,
    pairs: ConfusionPairStore,
    arcade: ArcadeStore,
}

impl Letterlab {
    pub fn new(kv: SharedKv) -> Self {
        Self {
            letters: LetterProgressStore::new(Arc::clone(&kv)),
            pairs: ConfusionPairStore::new(Arc::clone(&kv)),
            arcade: ArcadeStore::new(kv),
        }
    }

    /// Open the SQLite backend named by `config`
    pub async fn open(config: &Config) -> Result<Self> {
        let kv = SqliteKvStore::open(config.storage.location()).await?;
        debug!("Progress store ready at {:?}", kv.location());
        Ok(Self::new(Arc::new(kv)))
    }

    pub fn letters(&self) -> &LetterProgressStore {
        &self.letters
    }

    pub fn pairs(&self) -> &ConfusionPairStore {
        &self.pairs
    }

    pub fn arcade(&self) -> &ArcadeStore {
        &self.arcade
    }

    pub fn report(&self) -> ReportBuilder {
        ReportBuilder::new(self.letters.clone(), self.pairs.clone())
    }

    pub async fn migrate_legacy_monster_high_score(&self, id: &str) -> Result<u64> {
        migration::migrate_legacy_monster_high_score(&self.letters, id).await
    }
}
