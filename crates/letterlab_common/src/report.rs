//! Progress report for the parents' screen.
//!
//! Everything here is derived at read time from the stored letter and
//! confusion-pair records. Building a report never writes.

use crate::codec::MAX_STARS;
use crate::confusion::{ConfusionPairProgress, ConfusionPairStore};
use crate::error::Result;
use crate::progress::{LetterEntry, LetterProgressStore};
use serde::Serialize;
use std::fmt::Write as _;

/// Letters listed in each highlight group
pub const HIGHLIGHT_LIMIT: usize = 3;

/// History entries per letter considered for the trend line
pub const TREND_WINDOW: usize = 10;

/// Number of buckets in the synthetic trend
pub const SYNTHETIC_BUCKETS: usize = 5;

/// Confusion score below which a letter needs attention
pub const ATTENTION_CONFUSION_THRESHOLD: u8 = 60;

/// Core-skill rating below which a letter needs attention
pub const ATTENTION_MIN_STARS: u8 = 2;

/// Default number of weakest pairs included in a report
pub const DEFAULT_WEAKEST_PAIRS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStars {
    pub monster: u8,
    pub hero: u8,
    pub catch: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerLetterCard {
    pub id: String,
    pub uc: u8,
    pub lc: u8,
    pub recog: u8,
    pub draw: u8,
    pub unlocked: bool,
    pub confusion_score: u8,
    pub time_spent_ms: u64,
    pub games: GameStars,
}

impl From<&LetterEntry> for PerLetterCard {
    fn from(entry: &LetterEntry) -> Self {
        let p = &entry.data;
        Self {
            id: entry.id.clone(),
            uc: p.uc_stars,
            lc: p.lc_stars,
            recog: p.recog_stars,
            draw: p.draw_stars,
            unlocked: p.is_unlocked(),
            confusion_score: p.confusion_score,
            time_spent_ms: p.time_spent_ms,
            games: GameStars {
                monster: p.monster_stars,
                hero: p.hero_stars,
                catch: p.catch_stars,
            },
        }
    }
}

/// Two-decimal averages per star category
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarAverages {
    pub recog: f64,
    pub uc: f64,
    pub lc: f64,
    pub draw: f64,
    pub puzzle: f64,
    pub confusions: f64,
    pub case_match: f64,
    pub picture: f64,
}

/// Plain star sums for the core skills (bar chart input)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarDistribution {
    pub recog: u32,
    pub uc: u32,
    pub lc: u32,
    pub draw: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAverages {
    pub monster_avg: f64,
    pub hero_avg: f64,
    pub catch_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    /// Letters unlocked by the rule or by the sticky flag
    pub total_completed: usize,
    pub avg: StarAverages,
    pub stars_dist: StarDistribution,
    pub games: GameAverages,
    pub time_spent_min: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    /// Upper-case letters with 3 stars in recognition, uppercase and lowercase
    pub top3_strong: Vec<String>,
    /// Upper-case letters with a weak core skill or a low confusion score
    pub need_attention: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub value: u8,
}

/// Confusion-accuracy trend line.
///
/// `RealHistory` comes from recorded measurements. `SyntheticSnapshot` is
/// a placeholder built from current scores when no letter has history yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "camelCase")]
pub enum ConfusionTrend {
    RealHistory(Vec<TrendPoint>),
    SyntheticSnapshot(Vec<TrendPoint>),
}

impl ConfusionTrend {
    pub fn points(&self) -> &[TrendPoint] {
        match self {
            ConfusionTrend::RealHistory(points) | ConfusionTrend::SyntheticSnapshot(points) => {
                points
            }
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, ConfusionTrend::SyntheticSnapshot(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub summary: OverallSummary,
    pub per_letter: Vec<PerLetterCard>,
    pub highlights: Highlights,
    pub confusion_trend: ConfusionTrend,
    pub weakest_pairs: Vec<ConfusionPairProgress>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn avg<I>(values: I) -> f64
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(s, c), v| (s + v.into(), c + 1));
    if count == 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

fn trend_points(values: impl IntoIterator<Item = f64>) -> Vec<TrendPoint> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| TrendPoint {
            label: format!("T{}", i + 1),
            value: v.round().clamp(0.0, 100.0) as u8,
        })
        .collect()
}

/// Average the newest history of every letter, right-aligned.
///
/// Shorter series are padded on the left with their first value so the
/// newest measurement of each letter lands in the last column.
fn trend_from_history(letters: &[LetterEntry]) -> Vec<TrendPoint> {
    let series: Vec<Vec<u8>> = letters
        .iter()
        .map(|e| {
            let h = &e.data.confusion_history;
            h[h.len().saturating_sub(TREND_WINDOW)..]
                .iter()
                .map(|entry| entry.score)
                .collect::<Vec<u8>>()
        })
        .filter(|s| !s.is_empty())
        .collect();

    let max_len = series.iter().map(Vec::len).max().unwrap_or(0);
    let columns = (0..max_len).map(|col| {
        avg(series.iter().map(|s| {
            let pad = max_len - s.len();
            if col < pad {
                s[0]
            } else {
                s[col - pad]
            }
        }))
    });
    trend_points(columns)
}

/// Bucket letters into quintiles by current confusion score.
fn trend_from_snapshot(cards: &[PerLetterCard]) -> Vec<TrendPoint> {
    if cards.is_empty() {
        return Vec::new();
    }
    let mut scores: Vec<u8> = cards.iter().map(|c| c.confusion_score).collect();
    scores.sort();

    let n = scores.len();
    let bound = |fraction: f64| ((n as f64 * fraction).ceil() as usize).min(n);
    let mut edges = vec![0];
    edges.extend([0.2, 0.4, 0.6, 0.8].map(bound));
    edges.push(n);

    let buckets = edges.windows(2).take(SYNTHETIC_BUCKETS).map(|w| {
        let (start, end) = (w[0], w[1].max(w[0]));
        avg(scores[start..end].iter().copied())
    });
    trend_points(buckets)
}

/// Both lists are stable sorts over a-z input, so ties keep letter order.
fn highlights(letters: &[LetterEntry]) -> Highlights {
    let mut strong: Vec<&LetterEntry> = letters
        .iter()
        .filter(|e| e.data.core_stars().all(|s| s == MAX_STARS))
        .collect();
    strong.sort_by(|a, b| b.data.confusion_score.cmp(&a.data.confusion_score));

    let mut weak: Vec<&LetterEntry> = letters
        .iter()
        .filter(|e| {
            e.data.core_stars().any(|s| s < ATTENTION_MIN_STARS)
                || e.data.confusion_score < ATTENTION_CONFUSION_THRESHOLD
        })
        .collect();
    weak.sort_by_key(|e| e.data.confusion_score);

    let ids = |entries: Vec<&LetterEntry>| -> Vec<String> {
        entries
            .into_iter()
            .take(HIGHLIGHT_LIMIT)
            .map(|e| e.id.to_uppercase())
            .collect()
    };

    Highlights {
        top3_strong: ids(strong),
        need_attention: ids(weak),
    }
}

impl ProgressReport {
    /// Build a report from loaded records (pure function, deterministic)
    pub fn from_records(
        letters: &[LetterEntry],
        weakest_pairs: Vec<ConfusionPairProgress>,
    ) -> Self {
        let per_letter: Vec<PerLetterCard> = letters.iter().map(PerLetterCard::from).collect();
        let records = || letters.iter().map(|e| &e.data);

        let summary = OverallSummary {
            total_completed: per_letter.iter().filter(|c| c.unlocked).count(),
            avg: StarAverages {
                recog: avg(per_letter.iter().map(|c| c.recog)),
                uc: avg(per_letter.iter().map(|c| c.uc)),
                lc: avg(per_letter.iter().map(|c| c.lc)),
                draw: avg(per_letter.iter().map(|c| c.draw)),
                puzzle: avg(records().map(|p| p.puzzle_stars)),
                confusions: avg(records().map(|p| p.confusions_stars)),
                case_match: avg(records().map(|p| p.case_match_stars)),
                picture: avg(records().map(|p| p.picture_stars)),
            },
            stars_dist: StarDistribution {
                recog: per_letter.iter().map(|c| c.recog as u32).sum(),
                uc: per_letter.iter().map(|c| c.uc as u32).sum(),
                lc: per_letter.iter().map(|c| c.lc as u32).sum(),
                draw: per_letter.iter().map(|c| c.draw as u32).sum(),
            },
            games: GameAverages {
                monster_avg: avg(per_letter.iter().map(|c| c.games.monster)),
                hero_avg: avg(per_letter.iter().map(|c| c.games.hero)),
                catch_avg: avg(per_letter.iter().map(|c| c.games.catch)),
            },
            time_spent_min: {
                let total_ms: u64 = per_letter
                    .iter()
                    .fold(0u64, |acc, c| acc.saturating_add(c.time_spent_ms));
                (total_ms as f64 / 60_000.0).round() as u64
            },
        };

        let has_history = records().any(|p| p.confusion_history.len() > 1);
        let confusion_trend = if has_history {
            ConfusionTrend::RealHistory(trend_from_history(letters))
        } else {
            ConfusionTrend::SyntheticSnapshot(trend_from_snapshot(&per_letter))
        };

        Self {
            summary,
            highlights: highlights(letters),
            per_letter,
            confusion_trend,
            weakest_pairs,
        }
    }
}

/// Loads every record the report needs, then builds it.
pub struct ReportBuilder {
    letters: LetterProgressStore,
    pairs: ConfusionPairStore,
    weakest_limit: usize,
}

impl ReportBuilder {
    pub fn new(letters: LetterProgressStore, pairs: ConfusionPairStore) -> Self {
        Self {
            letters,
            pairs,
            weakest_limit: DEFAULT_WEAKEST_PAIRS,
        }
    }

    pub fn with_weakest_limit(mut self, limit: usize) -> Self {
        self.weakest_limit = limit;
        self
    }

    pub async fn build(&self) -> Result<ProgressReport> {
        let letters = self.letters.get_all().await?;
        let weakest = self.pairs.get_weakest(self.weakest_limit).await?;
        Ok(ProgressReport::from_records(&letters, weakest))
    }
}

/// Plain-text rendering of a report
pub fn format_text(report: &ProgressReport) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(out, "Letters completed: {}/{}", s.total_completed, report.per_letter.len());
    let _ = writeln!(out, "Time spent: {} min", s.time_spent_min);
    let _ = writeln!(
        out,
        "Average stars: recog {:.2} | upper {:.2} | lower {:.2} | draw {:.2}",
        s.avg.recog, s.avg.uc, s.avg.lc, s.avg.draw
    );
    let _ = writeln!(
        out,
        "Training stars: puzzle {:.2} | confusions {:.2} | case match {:.2} | picture {:.2}",
        s.avg.puzzle, s.avg.confusions, s.avg.case_match, s.avg.picture
    );
    let _ = writeln!(
        out,
        "Game stars: monster {:.2} | hero {:.2} | catch {:.2}",
        s.games.monster_avg, s.games.hero_avg, s.games.catch_avg
    );

    let list = |ids: &[String]| -> String {
        if ids.is_empty() {
            "-".to_string()
        } else {
            ids.join(", ")
        }
    };
    let _ = writeln!(out, "Strong: {}", list(&report.highlights.top3_strong));
    let _ = writeln!(out, "Needs attention: {}", list(&report.highlights.need_attention));

    let kind = if report.confusion_trend.is_synthetic() {
        "estimated"
    } else {
        "history"
    };
    let points: Vec<String> = report
        .confusion_trend
        .points()
        .iter()
        .map(|p| format!("{}={}", p.label, p.value))
        .collect();
    let _ = writeln!(out, "Confusion trend ({}): {}", kind, list(&points));

    if !report.weakest_pairs.is_empty() {
        let pairs: Vec<String> = report
            .weakest_pairs
            .iter()
            .map(|p| format!("{} {}%", p.pair, p.accuracy))
            .collect();
        let _ = writeln!(out, "Weakest pairs: {}", pairs.join(", "));
    }

    out
}
