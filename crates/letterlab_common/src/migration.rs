//! One-time migration of the pre-per-letter monster high score.
//!
//! Older builds kept a single Monster Feeding high score as a bare integer
//! string under `monster_high_score_v1`. It is folded into the letter being
//! opened when larger, then the legacy key is removed.

use crate::error::Result;
use crate::letters::MiniGame;
use crate::progress::LetterProgressStore;
use tracing::info;

pub const LEGACY_MONSTER_HIGH_SCORE_KEY: &str = "monster_high_score_v1";

fn parse_legacy_score(raw: &str) -> u64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.floor().max(0.0) as u64)
        .unwrap_or(0)
}

/// Fold the legacy score into `id` and return the letter's effective
/// monster high score. A no-op once the legacy key is gone.
pub async fn migrate_legacy_monster_high_score(
    store: &LetterProgressStore,
    id: &str,
) -> Result<u64> {
    let current = store.get(id).await?;
    let saved = current.monster_high_score;

    let Some(raw) = store.kv().get(LEGACY_MONSTER_HIGH_SCORE_KEY).await? else {
        return Ok(saved);
    };

    let legacy = parse_legacy_score(&raw);
    let effective = if legacy > saved {
        info!("Migrating legacy monster high score {} into {}", legacy, id);
        store
            .save_game_high_score(id, MiniGame::Monster, i64::try_from(legacy).unwrap_or(i64::MAX))
            .await?
            .monster_high_score
    } else {
        saved
    };

    store.kv().remove(LEGACY_MONSTER_HIGH_SCORE_KEY).await?;
    Ok(effective)
}
