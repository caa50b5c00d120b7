//! Confusion-pair accuracy tracking.
//!
//! Pairs of look-alike letters ("b/d", "p/q") are drilled together. Each
//! pair keeps cumulative correct/wrong counts under `confpair:<pair>`.

use crate::codec;
use crate::error::Result;
use crate::kv::SharedKv;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub const PAIR_PREFIX: &str = "confpair:";

/// Canonical, order-independent pair key.
///
/// Both sides are trimmed and lower-cased and then sorted, so `"D/b"` and
/// `"b/d"` name the same pair. Input without a `/` is kept as a single
/// trimmed, lower-cased token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_lowercase();
        match raw.split_once('/') {
            Some((a, b)) => {
                let (a, b) = (a.trim(), b.trim());
                if a <= b {
                    PairKey(format!("{}/{}", a, b))
                } else {
                    PairKey(format!("{}/{}", b, a))
                }
            }
            None => PairKey(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn storage_key(&self) -> String {
        format!("{}{}", PAIR_PREFIX, self.0)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `accuracy = round(100 * correct / (correct + wrong))`, 0 with no attempts
pub fn accuracy(correct: u64, wrong: u64) -> u8 {
    let total = correct.saturating_add(wrong);
    if total == 0 {
        return 0;
    }
    codec::clamp_percent(correct as f64 * 100.0 / total as f64)
}

/// Stored counters. Accuracy is never read back from storage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct StoredPair {
    #[serde(default, deserialize_with = "codec::counter")]
    correct: u64,
    #[serde(default, deserialize_with = "codec::counter")]
    wrong: u64,
    #[serde(default, skip_deserializing)]
    accuracy: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionPairProgress {
    pub pair: PairKey,
    pub correct: u64,
    pub wrong: u64,
    pub accuracy: u8,
}

impl ConfusionPairProgress {
    fn from_counts(pair: PairKey, correct: u64, wrong: u64) -> Self {
        Self {
            pair,
            correct,
            wrong,
            accuracy: accuracy(correct, wrong),
        }
    }

    pub fn attempts(&self) -> u64 {
        self.correct.saturating_add(self.wrong)
    }
}

#[derive(Clone)]
pub struct ConfusionPairStore {
    kv: SharedKv,
}

impl ConfusionPairStore {
    pub fn new(kv: SharedKv) -> Self {
        Self { kv }
    }

    /// Current counters for a pair, zero when never recorded or unreadable
    pub async fn get(&self, pair: &str) -> Result<ConfusionPairProgress> {
        let key = PairKey::new(pair);
        let stored = self.read(&key.storage_key()).await?.unwrap_or_default();
        Ok(ConfusionPairProgress::from_counts(
            key,
            stored.correct,
            stored.wrong,
        ))
    }

    /// Add one drill round's outcome to a pair's cumulative counts.
    pub async fn add_result(
        &self,
        pair: &str,
        correct_delta: u64,
        wrong_delta: u64,
    ) -> Result<ConfusionPairProgress> {
        let prev = self.get(pair).await?;
        let next = ConfusionPairProgress::from_counts(
            prev.pair,
            prev.correct.saturating_add(correct_delta),
            prev.wrong.saturating_add(wrong_delta),
        );

        let stored = StoredPair {
            correct: next.correct,
            wrong: next.wrong,
            accuracy: next.accuracy,
        };
        self.kv
            .set(&next.pair.storage_key(), &serde_json::to_string(&stored)?)
            .await?;
        debug!(
            "Pair {} now {}/{} ({}%)",
            next.pair, next.correct, next.wrong, next.accuracy
        );
        Ok(next)
    }

    /// Every recorded pair in key order. Unreadable entries are skipped.
    pub async fn get_all(&self) -> Result<Vec<ConfusionPairProgress>> {
        let mut keys: Vec<String> = self
            .kv
            .list_keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(PAIR_PREFIX))
            .collect();
        keys.sort();

        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(stored) = self.read(&key).await? else {
                continue;
            };
            let pair = PairKey(key[PAIR_PREFIX.len()..].to_string());
            out.push(ConfusionPairProgress::from_counts(
                pair,
                stored.correct,
                stored.wrong,
            ));
        }
        Ok(out)
    }

    /// The `limit` pairs with the lowest accuracy. Ties keep key order.
    pub async fn get_weakest(&self, limit: usize) -> Result<Vec<ConfusionPairProgress>> {
        let mut all = self.get_all().await?;
        all.sort_by_key(|p| p.accuracy);
        all.truncate(limit);
        Ok(all)
    }

    async fn read(&self, key: &str) -> Result<Option<StoredPair>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match codec::decode_object::<StoredPair>(&raw) {
            Some(stored) => Ok(Some(stored)),
            None => {
                warn!("Skipping corrupt confusion pair entry at {}", key);
                Ok(None)
            }
        }
    }
}
