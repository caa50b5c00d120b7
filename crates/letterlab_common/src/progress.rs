//! Per-letter progress records.
//!
//! One record per letter id under `progress:<id>`. Stars and high scores
//! only move up, the confusion score is a plain measurement that is
//! overwritten, and the games unlock is a sticky one-way flag.

use crate::codec::{self, MAX_STARS};
use crate::error::Result;
use crate::kv::SharedKv;
use crate::letters::{canonical_letters, normalize_id, MiniGame, StarField};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Newest confusion-history entries kept per letter
pub const HISTORY_CAP: usize = 14;

/// Minimum core stars (recognition, uppercase, lowercase) for the unlock rule
pub const UNLOCK_MIN_STARS: u8 = 2;

/// Minimum confusion score for the unlock rule
pub const UNLOCK_MIN_CONFUSION: u8 = 80;

/// Storage key for a letter record
pub fn progress_key(id: &str) -> String {
    format!("progress:{}", normalize_id(id))
}

/// Whether a letter's mini-games are open. Persisted as a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum UnlockState {
    #[default]
    Locked,
    Unlocked,
}

impl UnlockState {
    /// One-way transition: an unlocked letter stays unlocked.
    pub fn maybe_unlock(self, predicate: bool) -> Self {
        if self == UnlockState::Unlocked || predicate {
            UnlockState::Unlocked
        } else {
            UnlockState::Locked
        }
    }

    pub fn is_unlocked(self) -> bool {
        self == UnlockState::Unlocked
    }
}

impl From<bool> for UnlockState {
    fn from(value: bool) -> Self {
        if value {
            UnlockState::Unlocked
        } else {
            UnlockState::Locked
        }
    }
}

impl From<UnlockState> for bool {
    fn from(state: UnlockState) -> Self {
        state.is_unlocked()
    }
}

fn lenient_unlock<'de, D>(deserializer: D) -> std::result::Result<UnlockState, D::Error>
where
    D: serde::Deserializer<'de>,
{
    codec::flag(deserializer).map(UnlockState::from)
}

/// A single confusion measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix time in milliseconds
    #[serde(default, deserialize_with = "codec::timestamp")]
    pub ts: i64,
    #[serde(default, deserialize_with = "codec::percent")]
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterProgress {
    // Core learning
    #[serde(default, deserialize_with = "codec::stars")]
    pub recog_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub uc_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub lc_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub draw_stars: u8,

    // Optional training
    #[serde(default, deserialize_with = "codec::stars")]
    pub puzzle_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub confusions_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub case_match_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub picture_stars: u8,

    // Metrics
    #[serde(default, deserialize_with = "codec::percent")]
    pub confusion_score: u8,
    #[serde(default, deserialize_with = "codec::lenient_list")]
    pub confusion_history: Vec<HistoryEntry>,

    // Mini-game stars
    #[serde(default, deserialize_with = "codec::stars")]
    pub monster_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub hero_stars: u8,
    #[serde(default, deserialize_with = "codec::stars")]
    pub catch_stars: u8,

    // High scores
    #[serde(default, deserialize_with = "codec::counter")]
    pub monster_high_score: u64,
    #[serde(default, deserialize_with = "codec::counter")]
    pub hero_high_score: u64,
    #[serde(default, deserialize_with = "codec::counter")]
    pub catch_high_score: u64,
    #[serde(default, deserialize_with = "codec::counter")]
    pub garden_high_score: u64,

    #[serde(default, deserialize_with = "lenient_unlock")]
    pub games_unlocked: UnlockState,

    #[serde(default, deserialize_with = "codec::counter")]
    pub time_spent_ms: u64,
}

impl LetterProgress {
    /// Decode a stored payload; `None` when it is not a JSON object.
    pub fn decode(raw: &str) -> Option<Self> {
        let mut record: LetterProgress = codec::decode_object(raw)?;
        record.trim_history();
        Some(record)
    }

    pub fn stars(&self, field: StarField) -> u8 {
        match field {
            StarField::RecogStars => self.recog_stars,
            StarField::UcStars => self.uc_stars,
            StarField::LcStars => self.lc_stars,
            StarField::DrawStars => self.draw_stars,
            StarField::PuzzleStars => self.puzzle_stars,
            StarField::ConfusionsStars => self.confusions_stars,
            StarField::CaseMatchStars => self.case_match_stars,
            StarField::PictureStars => self.picture_stars,
            StarField::MonsterStars => self.monster_stars,
            StarField::HeroStars => self.hero_stars,
            StarField::CatchStars => self.catch_stars,
        }
    }

    fn stars_mut(&mut self, field: StarField) -> &mut u8 {
        match field {
            StarField::RecogStars => &mut self.recog_stars,
            StarField::UcStars => &mut self.uc_stars,
            StarField::LcStars => &mut self.lc_stars,
            StarField::DrawStars => &mut self.draw_stars,
            StarField::PuzzleStars => &mut self.puzzle_stars,
            StarField::ConfusionsStars => &mut self.confusions_stars,
            StarField::CaseMatchStars => &mut self.case_match_stars,
            StarField::PictureStars => &mut self.picture_stars,
            StarField::MonsterStars => &mut self.monster_stars,
            StarField::HeroStars => &mut self.hero_stars,
            StarField::CatchStars => &mut self.catch_stars,
        }
    }

    pub fn high_score(&self, game: MiniGame) -> u64 {
        match game {
            MiniGame::Monster => self.monster_high_score,
            MiniGame::Hero => self.hero_high_score,
            MiniGame::Catch => self.catch_high_score,
            MiniGame::Garden => self.garden_high_score,
        }
    }

    fn high_score_mut(&mut self, game: MiniGame) -> &mut u64 {
        match game {
            MiniGame::Monster => &mut self.monster_high_score,
            MiniGame::Hero => &mut self.hero_high_score,
            MiniGame::Catch => &mut self.catch_high_score,
            MiniGame::Garden => &mut self.garden_high_score,
        }
    }

    /// Ratings of the core skills: recognition, uppercase, lowercase
    pub fn core_stars(&self) -> impl Iterator<Item = u8> + '_ {
        let fields: &'static [StarField] = &StarField::ALL;
        fields
            .iter()
            .filter(|f| f.is_core())
            .map(move |f| self.stars(*f))
    }

    /// The unlock rule on current stats alone
    pub fn meets_unlock_rule(&self) -> bool {
        self.core_stars().all(|s| s >= UNLOCK_MIN_STARS)
            && self.confusion_score >= UNLOCK_MIN_CONFUSION
    }

    /// Unlocked by the rule now or by the persisted sticky flag
    pub fn is_unlocked(&self) -> bool {
        self.meets_unlock_rule() || self.games_unlocked.is_unlocked()
    }

    /// Sum of every star field on this record
    pub fn total_stars(&self) -> u32 {
        StarField::ALL.iter().map(|f| self.stars(*f) as u32).sum()
    }

    fn trim_history(&mut self) {
        let len = self.confusion_history.len();
        if len > HISTORY_CAP {
            self.confusion_history.drain(..len - HISTORY_CAP);
        }
    }
}

/// Partial update merged over a stored record.
///
/// `None` leaves the field untouched. The unlock flag is not patchable:
/// it is re-derived on every patch and only ever turns on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LetterPatch {
    pub recog_stars: Option<u8>,
    pub uc_stars: Option<u8>,
    pub lc_stars: Option<u8>,
    pub draw_stars: Option<u8>,
    pub puzzle_stars: Option<u8>,
    pub confusions_stars: Option<u8>,
    pub case_match_stars: Option<u8>,
    pub picture_stars: Option<u8>,
    pub confusion_score: Option<u8>,
    pub confusion_history: Option<Vec<HistoryEntry>>,
    pub monster_stars: Option<u8>,
    pub hero_stars: Option<u8>,
    pub catch_stars: Option<u8>,
    pub monster_high_score: Option<u64>,
    pub hero_high_score: Option<u64>,
    pub catch_high_score: Option<u64>,
    pub garden_high_score: Option<u64>,
    pub time_spent_ms: Option<u64>,
}

impl LetterPatch {
    /// Patch touching a single star field
    pub fn stars(field: StarField, value: u8) -> Self {
        let mut patch = Self::default();
        let slot = match field {
            StarField::RecogStars => &mut patch.recog_stars,
            StarField::UcStars => &mut patch.uc_stars,
            StarField::LcStars => &mut patch.lc_stars,
            StarField::DrawStars => &mut patch.draw_stars,
            StarField::PuzzleStars => &mut patch.puzzle_stars,
            StarField::ConfusionsStars => &mut patch.confusions_stars,
            StarField::CaseMatchStars => &mut patch.case_match_stars,
            StarField::PictureStars => &mut patch.picture_stars,
            StarField::MonsterStars => &mut patch.monster_stars,
            StarField::HeroStars => &mut patch.hero_stars,
            StarField::CatchStars => &mut patch.catch_stars,
        };
        *slot = Some(value);
        patch
    }

    /// Patch touching a single high-score field
    pub fn high_score(game: MiniGame, value: u64) -> Self {
        let mut patch = Self::default();
        let slot = match game {
            MiniGame::Monster => &mut patch.monster_high_score,
            MiniGame::Hero => &mut patch.hero_high_score,
            MiniGame::Catch => &mut patch.catch_high_score,
            MiniGame::Garden => &mut patch.garden_high_score,
        };
        *slot = Some(value);
        patch
    }

    /// Shallow merge over `target`, clamping stars and scores to range
    fn apply(self, target: &mut LetterProgress) {
        let star_updates = [
            (StarField::RecogStars, self.recog_stars),
            (StarField::UcStars, self.uc_stars),
            (StarField::LcStars, self.lc_stars),
            (StarField::DrawStars, self.draw_stars),
            (StarField::PuzzleStars, self.puzzle_stars),
            (StarField::ConfusionsStars, self.confusions_stars),
            (StarField::CaseMatchStars, self.case_match_stars),
            (StarField::PictureStars, self.picture_stars),
            (StarField::MonsterStars, self.monster_stars),
            (StarField::HeroStars, self.hero_stars),
            (StarField::CatchStars, self.catch_stars),
        ];
        for (field, value) in star_updates {
            if let Some(v) = value {
                *target.stars_mut(field) = v.min(MAX_STARS);
            }
        }

        let score_updates = [
            (MiniGame::Monster, self.monster_high_score),
            (MiniGame::Hero, self.hero_high_score),
            (MiniGame::Catch, self.catch_high_score),
            (MiniGame::Garden, self.garden_high_score),
        ];
        for (game, value) in score_updates {
            if let Some(v) = value {
                *target.high_score_mut(game) = v;
            }
        }

        if let Some(score) = self.confusion_score {
            target.confusion_score = score.min(codec::MAX_PERCENT);
        }
        if let Some(history) = self.confusion_history {
            target.confusion_history = history;
            target.trim_history();
        }
        if let Some(ms) = self.time_spent_ms {
            target.time_spent_ms = ms;
        }
    }
}

/// Options for [`LetterProgressStore::set_confusion_score`]
#[derive(Debug, Clone, Copy)]
pub struct ConfusionScoreOptions {
    pub append_history: bool,
}

impl Default for ConfusionScoreOptions {
    fn default() -> Self {
        Self {
            append_history: true,
        }
    }
}

/// A letter id with its record, as returned by [`LetterProgressStore::get_all`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterEntry {
    pub id: String,
    pub data: LetterProgress,
}

/// Per-letter progress over an injected key-value store
#[derive(Clone)]
pub struct LetterProgressStore {
    kv: SharedKv,
}

impl LetterProgressStore {
    pub fn new(kv: SharedKv) -> Self {
        Self { kv }
    }

    /// Read a letter, materializing defaults for missing or corrupt records.
    pub async fn get(&self, id: &str) -> Result<LetterProgress> {
        let key = progress_key(id);
        let raw = match self.kv.get(&key).await? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(LetterProgress::default()),
        };
        match LetterProgress::decode(&raw) {
            Some(record) => Ok(record),
            None => {
                warn!("Corrupt progress record at {}, using defaults", key);
                Ok(LetterProgress::default())
            }
        }
    }

    /// Merge `patch` over the current record, re-derive the unlock flag and persist.
    pub async fn patch(&self, id: &str, patch: LetterPatch) -> Result<LetterProgress> {
        let mut next = self.get(id).await?;
        patch.apply(&mut next);
        next.games_unlocked = next.games_unlocked.maybe_unlock(next.meets_unlock_rule());
        self.write(id, &next).await?;
        Ok(next)
    }

    /// Raise a star rating; lower or equal ratings leave storage untouched.
    pub async fn award_stars(
        &self,
        id: &str,
        field: StarField,
        stars: i64,
    ) -> Result<LetterProgress> {
        let current = self.get(id).await?;
        let clamped = stars.clamp(0, MAX_STARS as i64) as u8;
        let have = current.stars(field);
        if clamped <= have {
            debug!("{} {} already at {} stars, skipping write", id, field, have);
            return Ok(current);
        }
        self.patch(id, LetterPatch::stars(field, clamped)).await
    }

    /// Record a mini-game score if it beats the stored high score.
    pub async fn save_game_high_score(
        &self,
        id: &str,
        game: MiniGame,
        score: i64,
    ) -> Result<LetterProgress> {
        let current = self.get(id).await?;
        let score = score.max(0) as u64;
        if score <= current.high_score(game) {
            return Ok(current);
        }
        debug!("New {} high score for {}: {}", game.name(), id, score);
        self.patch(id, LetterPatch::high_score(game, score)).await
    }

    pub async fn save_garden_high_score(&self, id: &str, score: i64) -> Result<LetterProgress> {
        self.save_game_high_score(id, MiniGame::Garden, score).await
    }

    /// Overwrite the confusion score (a measurement, not a best-ever value)
    /// and optionally log it to the bounded history.
    pub async fn set_confusion_score(
        &self,
        id: &str,
        score: f64,
        opts: ConfusionScoreOptions,
    ) -> Result<LetterProgress> {
        let score = codec::clamp_percent(score);
        let current = self.get(id).await?;

        let mut patch = LetterPatch {
            confusion_score: Some(score),
            ..Default::default()
        };
        if opts.append_history {
            let mut history = current.confusion_history;
            history.push(HistoryEntry {
                ts: Utc::now().timestamp_millis(),
                score,
            });
            patch.confusion_history = Some(history);
        }

        self.patch(id, patch).await
    }

    /// Accumulate play time; negative deltas count as zero.
    pub async fn add_time_spent(&self, id: &str, delta_ms: i64) -> Result<LetterProgress> {
        let current = self.get(id).await?;
        let delta = delta_ms.max(0) as u64;
        let patch = LetterPatch {
            time_spent_ms: Some(current.time_spent_ms.saturating_add(delta)),
            ..Default::default()
        };
        self.patch(id, patch).await
    }

    /// Overwrite a letter with defaults. Debug and test flows only.
    pub async fn reset(&self, id: &str) -> Result<LetterProgress> {
        let fresh = LetterProgress::default();
        self.write(id, &fresh).await?;
        debug!("Reset progress for {}", id);
        Ok(fresh)
    }

    /// Remove every canonical letter record
    pub async fn clear_all(&self) -> Result<()> {
        for id in canonical_letters() {
            self.kv.remove(&progress_key(&id)).await?;
        }
        Ok(())
    }

    /// All 26 canonical letters in a–z order, defaults for unwritten ones
    pub async fn get_all(&self) -> Result<Vec<LetterEntry>> {
        let mut out = Vec::with_capacity(crate::letters::LETTER_COUNT);
        for id in canonical_letters() {
            let data = self.get(&id).await?;
            out.push(LetterEntry { id, data });
        }
        Ok(out)
    }

    /// Sum of every star field across the canonical letters
    pub async fn total_stars(&self) -> Result<u32> {
        let all = self.get_all().await?;
        Ok(all.iter().map(|e| e.data.total_stars()).sum())
    }

    pub(crate) fn kv(&self) -> &SharedKv {
        &self.kv
    }

    async fn write(&self, id: &str, record: &LetterProgress) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.kv.set(&progress_key(id), &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_state_is_one_way() {
        assert_eq!(UnlockState::Locked.maybe_unlock(false), UnlockState::Locked);
        assert_eq!(UnlockState::Locked.maybe_unlock(true), UnlockState::Unlocked);
        assert_eq!(UnlockState::Unlocked.maybe_unlock(false), UnlockState::Unlocked);
    }

    #[test]
    fn test_decode_backfills_and_clamps() {
        let raw = r#"{
            "ucStars": 9,
            "lcStars": "two",
            "recogStars": null,
            "confusionScore": 250,
            "confusionHistory": "oops",
            "monsterHighScore": -4,
            "timeSpentMs": 1500.9,
            "gamesUnlocked": true,
            "someFutureField": [1, 2, 3]
        }"#;
        let p = LetterProgress::decode(raw).unwrap();
        assert_eq!(p.uc_stars, 3);
        assert_eq!(p.lc_stars, 0);
        assert_eq!(p.recog_stars, 0);
        assert_eq!(p.confusion_score, 100);
        assert!(p.confusion_history.is_empty());
        assert_eq!(p.monster_high_score, 0);
        assert_eq!(p.time_spent_ms, 1500);
        assert_eq!(p.games_unlocked, UnlockState::Unlocked);
    }

    #[test]
    fn test_decode_history_skips_bad_entries_and_caps() {
        let mut entries: Vec<String> = (0..20)
            .map(|i| format!(r#"{{"ts": {}, "score": {}}}"#, i, i * 5))
            .collect();
        entries.insert(3, "\"garbage\"".to_string());
        let raw = format!(r#"{{"confusionHistory": [{}]}}"#, entries.join(","));

        let p = LetterProgress::decode(&raw).unwrap();
        assert_eq!(p.confusion_history.len(), HISTORY_CAP);
        assert_eq!(p.confusion_history.first().map(|h| h.ts), Some(6));
        assert_eq!(p.confusion_history.last().map(|h| h.score), Some(95));
    }

    #[test]
    fn test_serialized_field_names() {
        let p = LetterProgress {
            case_match_stars: 2,
            games_unlocked: UnlockState::Unlocked,
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&p).unwrap();
        assert_eq!(json["caseMatchStars"], 2);
        assert_eq!(json["gamesUnlocked"], true);
        assert!(json["confusionHistory"].is_array());
        assert_eq!(json["timeSpentMs"], 0);
    }

    #[test]
    fn test_unlock_rule_reads_core_stars_only() {
        let mut p = LetterProgress {
            recog_stars: 2,
            uc_stars: 3,
            lc_stars: 2,
            confusion_score: 80,
            ..Default::default()
        };
        assert_eq!(p.core_stars().collect::<Vec<_>>(), vec![2, 3, 2]);
        assert!(p.meets_unlock_rule());

        p.draw_stars = 0;
        p.lc_stars = 1;
        p.picture_stars = 3;
        assert!(!p.meets_unlock_rule());
    }

    #[test]
    fn test_patch_clamps_stars() {
        let mut p = LetterProgress::default();
        LetterPatch::stars(StarField::DrawStars, 8).apply(&mut p);
        assert_eq!(p.draw_stars, 3);
    }

    #[test]
    fn test_total_stars_counts_every_field() {
        let mut p = LetterProgress::default();
        for field in StarField::ALL {
            LetterPatch::stars(field, 1).apply(&mut p);
        }
        assert_eq!(p.total_stars(), 11);
    }
}
