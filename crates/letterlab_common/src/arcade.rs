//! Global arcade record: best scores and star ratings per arcade game.

use crate::codec::{self, MAX_STARS};
use crate::error::Result;
use crate::kv::SharedKv;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

pub const ARCADE_KEY: &str = "arcade_progress_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcadeGame {
    Monster,
    Hero,
    Catch,
    Puzzle,
    Garden,
    Safari,
}

impl ArcadeGame {
    pub const ALL: [ArcadeGame; 6] = [
        ArcadeGame::Monster,
        ArcadeGame::Hero,
        ArcadeGame::Catch,
        ArcadeGame::Puzzle,
        ArcadeGame::Garden,
        ArcadeGame::Safari,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArcadeGame::Monster => "monster",
            ArcadeGame::Hero => "hero",
            ArcadeGame::Catch => "catch",
            ArcadeGame::Puzzle => "puzzle",
            ArcadeGame::Garden => "garden",
            ArcadeGame::Safari => "safari",
        }
    }
}

impl FromStr for ArcadeGame {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ArcadeGame::ALL
            .iter()
            .copied()
            .find(|g| g.name() == wanted)
            .ok_or_else(|| format!("unknown arcade game: {}", s))
    }
}

/// The singleton arcade record. Fields missing from an older payload
/// decode to zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeProgress {
    #[serde(default, deserialize_with = "codec::counter")]
    pub monster_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub monster_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub hero_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub hero_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub catch_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub catch_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub puzzle_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub puzzle_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub garden_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub garden_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub safari_high: u64,
    #[serde(default, deserialize_with = "codec::stars")]
    pub safari_stars: u8,

    #[serde(default, deserialize_with = "codec::counter")]
    pub stickers: u64,
}

impl ArcadeProgress {
    pub fn high(&self, game: ArcadeGame) -> u64 {
        match game {
            ArcadeGame::Monster => self.monster_high,
            ArcadeGame::Hero => self.hero_high,
            ArcadeGame::Catch => self.catch_high,
            ArcadeGame::Puzzle => self.puzzle_high,
            ArcadeGame::Garden => self.garden_high,
            ArcadeGame::Safari => self.safari_high,
        }
    }

    fn high_mut(&mut self, game: ArcadeGame) -> &mut u64 {
        match game {
            ArcadeGame::Monster => &mut self.monster_high,
            ArcadeGame::Hero => &mut self.hero_high,
            ArcadeGame::Catch => &mut self.catch_high,
            ArcadeGame::Puzzle => &mut self.puzzle_high,
            ArcadeGame::Garden => &mut self.garden_high,
            ArcadeGame::Safari => &mut self.safari_high,
        }
    }

    pub fn stars(&self, game: ArcadeGame) -> u8 {
        match game {
            ArcadeGame::Monster => self.monster_stars,
            ArcadeGame::Hero => self.hero_stars,
            ArcadeGame::Catch => self.catch_stars,
            ArcadeGame::Puzzle => self.puzzle_stars,
            ArcadeGame::Garden => self.garden_stars,
            ArcadeGame::Safari => self.safari_stars,
        }
    }

    fn stars_mut(&mut self, game: ArcadeGame) -> &mut u8 {
        match game {
            ArcadeGame::Monster => &mut self.monster_stars,
            ArcadeGame::Hero => &mut self.hero_stars,
            ArcadeGame::Catch => &mut self.catch_stars,
            ArcadeGame::Puzzle => &mut self.puzzle_stars,
            ArcadeGame::Garden => &mut self.garden_stars,
            ArcadeGame::Safari => &mut self.safari_stars,
        }
    }
}

#[derive(Clone)]
pub struct ArcadeStore {
    kv: SharedKv,
}

impl ArcadeStore {
    pub fn new(kv: SharedKv) -> Self {
        Self { kv }
    }

    pub async fn get(&self) -> Result<ArcadeProgress> {
        let Some(raw) = self.kv.get(ARCADE_KEY).await? else {
            return Ok(ArcadeProgress::default());
        };
        match codec::decode_object(&raw) {
            Some(progress) => Ok(progress),
            None => {
                warn!("Corrupt arcade record, using defaults");
                Ok(ArcadeProgress::default())
            }
        }
    }

    /// Keep the larger of the stored and submitted high score.
    pub async fn set_high(&self, game: ArcadeGame, value: i64) -> Result<ArcadeProgress> {
        let mut cur = self.get().await?;
        let slot = cur.high_mut(game);
        *slot = (*slot).max(value.max(0) as u64);
        self.write(&cur).await?;
        Ok(cur)
    }

    /// Keep the better of the stored and submitted star rating (0–3).
    pub async fn award_stars(&self, game: ArcadeGame, stars: i64) -> Result<ArcadeProgress> {
        let mut cur = self.get().await?;
        let clamped = stars.clamp(0, MAX_STARS as i64) as u8;
        let slot = cur.stars_mut(game);
        *slot = (*slot).max(clamped);
        self.write(&cur).await?;
        Ok(cur)
    }

    pub async fn add_stickers(&self, count: u64) -> Result<ArcadeProgress> {
        let mut cur = self.get().await?;
        cur.stickers = cur.stickers.saturating_add(count);
        self.write(&cur).await?;
        Ok(cur)
    }

    async fn write(&self, progress: &ArcadeProgress) -> Result<()> {
        debug!("Writing arcade record");
        self.kv
            .set(ARCADE_KEY, &serde_json::to_string(progress)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_defaults_missing_games() {
        let p: ArcadeProgress =
            codec::decode_object(r#"{"monsterHigh": 12, "heroStars": 2, "rocketHigh": 5}"#)
                .unwrap();
        assert_eq!(p.high(ArcadeGame::Monster), 12);
        assert_eq!(p.stars(ArcadeGame::Hero), 2);
        assert_eq!(p.high(ArcadeGame::Safari), 0);
        assert_eq!(p.stickers, 0);
    }

    #[test]
    fn test_game_names_parse() {
        for game in ArcadeGame::ALL {
            assert_eq!(game.name().parse::<ArcadeGame>(), Ok(game));
        }
        assert!("pinball".parse::<ArcadeGame>().is_err());
    }
}
