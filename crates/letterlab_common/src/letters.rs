//! Letter ids, skill fields and mini-game names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical letter ids in report order
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Number of canonical letters
pub const LETTER_COUNT: usize = 26;

/// Iterate the 26 canonical ids, `"a"` through `"z"`
pub fn canonical_letters() -> impl Iterator<Item = String> {
    ALPHABET.chars().map(|c| c.to_string())
}

/// Normalize a caller-supplied id (`"A"`, `" garden "`) to its storage form
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Skills rated with 0–3 stars on each letter record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StarField {
    // Core learning
    RecogStars,
    UcStars,
    LcStars,
    DrawStars,
    // Optional common training
    PuzzleStars,
    ConfusionsStars,
    CaseMatchStars,
    PictureStars,
    // Per-letter mini-games
    MonsterStars,
    HeroStars,
    CatchStars,
}

impl StarField {
    pub const ALL: [StarField; 11] = [
        StarField::RecogStars,
        StarField::UcStars,
        StarField::LcStars,
        StarField::DrawStars,
        StarField::PuzzleStars,
        StarField::ConfusionsStars,
        StarField::CaseMatchStars,
        StarField::PictureStars,
        StarField::MonsterStars,
        StarField::HeroStars,
        StarField::CatchStars,
    ];

    /// Field name as persisted in the letter record
    pub fn as_key(&self) -> &'static str {
        match self {
            StarField::RecogStars => "recogStars",
            StarField::UcStars => "ucStars",
            StarField::LcStars => "lcStars",
            StarField::DrawStars => "drawStars",
            StarField::PuzzleStars => "puzzleStars",
            StarField::ConfusionsStars => "confusionsStars",
            StarField::CaseMatchStars => "caseMatchStars",
            StarField::PictureStars => "pictureStars",
            StarField::MonsterStars => "monsterStars",
            StarField::HeroStars => "heroStars",
            StarField::CatchStars => "catchStars",
        }
    }

    /// Core skills that gate the unlock rule and the report highlights
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            StarField::RecogStars | StarField::UcStars | StarField::LcStars
        )
    }
}

impl fmt::Display for StarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for StarField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StarField::ALL
            .iter()
            .copied()
            .find(|f| f.as_key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown star field: {}", s))
    }
}

/// Mini-games that keep a per-letter high score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiniGame {
    Monster,
    Hero,
    Catch,
    Garden,
}

impl MiniGame {
    pub fn name(&self) -> &'static str {
        match self {
            MiniGame::Monster => "monster",
            MiniGame::Hero => "hero",
            MiniGame::Catch => "catch",
            MiniGame::Garden => "garden",
        }
    }
}

impl FromStr for MiniGame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monster" => Ok(MiniGame::Monster),
            "hero" => Ok(MiniGame::Hero),
            "catch" => Ok(MiniGame::Catch),
            "garden" => Ok(MiniGame::Garden),
            other => Err(format!("unknown mini-game: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_letters() {
        let ids: Vec<String> = canonical_letters().collect();
        assert_eq!(ids.len(), LETTER_COUNT);
        assert_eq!(ids.first().map(String::as_str), Some("a"));
        assert_eq!(ids.last().map(String::as_str), Some("z"));
    }

    #[test]
    fn test_star_field_parse() {
        assert_eq!("ucStars".parse::<StarField>(), Ok(StarField::UcStars));
        assert_eq!("CASEMATCHSTARS".parse::<StarField>(), Ok(StarField::CaseMatchStars));
        assert!("gamesUnlocked".parse::<StarField>().is_err());
        assert_eq!(StarField::ALL.iter().filter(|f| f.is_core()).count(), 3);
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id(" Q "), "q");
        assert_eq!(normalize_id("Garden"), "garden");
    }
}
