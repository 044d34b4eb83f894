use std::sync::LazyLock;

use super::similarity_strategy::{MaxStrategy, SimilarityStrategy};
use super::title_normalizer::normalize_title;
use crate::shared::domain::MediaType;

/// What the scorer knows about one side of a comparison
#[derive(Debug, Clone, Copy)]
pub struct TitleFacts<'a> {
    pub title: &'a str,
    pub alternative_titles: &'a [String],
    pub year: Option<i32>,
    pub media_type: MediaType,
    pub total_episodes: Option<u32>,
}

impl<'a> TitleFacts<'a> {
    pub fn new(title: &'a str, media_type: MediaType) -> Self {
        Self {
            title,
            alternative_titles: &[],
            year: None,
            media_type,
            total_episodes: None,
        }
    }

    pub fn with_alternative_titles(mut self, titles: &'a [String]) -> Self {
        self.alternative_titles = titles;
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_total_episodes(mut self, total: Option<u32>) -> Self {
        self.total_episodes = total;
        self
    }

    fn normalized_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::with_capacity(self.alternative_titles.len() + 1);
        for title in std::iter::once(self.title).chain(self.alternative_titles.iter().map(String::as_str)) {
            let normalized = normalize_title(title);
            if !normalized.is_empty() && !titles.contains(&normalized) {
                titles.push(normalized);
            }
        }
        titles
    }
}

/// Penalty for incompatible media types
const TYPE_MISMATCH_PENALTY: f64 = 0.3;
/// Primary runs at least this long get the hard episode-count reject
const LONG_RUNNING_EPISODES: u32 = 100;
const LONG_RUNNING_MAX_RATIO: f64 = 0.5;
const UNKNOWN_EPISODES_PENALTY: f64 = 0.15;
/// Year gap at which a candidate is rejected outright
pub const MAX_YEAR_GAP: i32 = 15;

/// Scores how likely two catalog entries describe the same title
pub struct ConfidenceScorer {
    similarity: Box<dyn SimilarityStrategy>,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(Box::new(MaxStrategy::title_similarity()))
    }
}

impl ConfidenceScorer {
    pub fn new(similarity: Box<dyn SimilarityStrategy>) -> Self {
        Self { similarity }
    }

    /// Confidence in [0, 1], or `None` when a hard rule rejects the candidate
    pub fn score(&self, source: &TitleFacts<'_>, target: &TitleFacts<'_>) -> Option<f64> {
        let year_adjustment = year_adjustment(source.year, target.year)?;
        let episode_adjustment = episode_adjustment(source.total_episodes, target.total_episodes)?;

        let mut confidence = self.title_similarity(source, target);
        confidence += year_adjustment + episode_adjustment;

        if !source.media_type.is_compatible_with(target.media_type) {
            confidence -= TYPE_MISMATCH_PENALTY;
        }

        let confidence = confidence.clamp(0.0, 1.0);
        log::trace!(
            "{} ({}) vs {}: {:.3}",
            source.title,
            self.similarity.name(),
            target.title,
            confidence
        );
        Some(confidence)
    }

    /// Best similarity over every source/target title pair
    pub fn title_similarity(&self, source: &TitleFacts<'_>, target: &TitleFacts<'_>) -> f64 {
        let source_titles = source.normalized_titles();
        let target_titles = target.normalized_titles();

        let mut best: f64 = 0.0;
        for a in &source_titles {
            for b in &target_titles {
                best = best.max(self.similarity.calculate(a, b));
                if best >= 1.0 {
                    return 1.0;
                }
            }
        }
        best
    }
}

/// `None` rejects; otherwise the amount added to the base score
fn year_adjustment(source: Option<i32>, target: Option<i32>) -> Option<f64> {
    let (Some(source), Some(target)) = (source, target) else {
        return Some(0.0);
    };

    match (source - target).abs() {
        0..=2 => Some(0.0),
        3..=4 => Some(-0.05),
        5..=9 => Some(-0.1),
        10..=14 => Some(-0.2),
        _ => None,
    }
}

/// `None` rejects; otherwise the amount added to the base score
fn episode_adjustment(primary: Option<u32>, candidate: Option<u32>) -> Option<f64> {
    let primary = match primary {
        Some(total) if total > 0 => total,
        _ => return Some(0.0),
    };
    let candidate = match candidate {
        Some(total) if total > 0 => total,
        _ => return Some(-UNKNOWN_EPISODES_PENALTY),
    };

    let ratio = primary.abs_diff(candidate) as f64 / primary as f64;
    if primary >= LONG_RUNNING_EPISODES && ratio >= LONG_RUNNING_MAX_RATIO {
        return None;
    }

    let adjustment = if ratio <= 0.05 {
        0.15
    } else if ratio <= 0.15 {
        0.08
    } else if ratio <= 0.30 {
        0.02
    } else {
        -0.08
    };
    Some(adjustment)
}

static DEFAULT_SCORER: LazyLock<ConfidenceScorer> = LazyLock::new(ConfidenceScorer::default);

/// Confidence that `target` is the same title as `source`; 0.0 when rejected
pub fn calculate_match_confidence(source: &TitleFacts<'_>, target: &TitleFacts<'_>) -> f64 {
    DEFAULT_SCORER.score(source, target).unwrap_or(0.0)
}

/// Like [`calculate_match_confidence`] but a rejection is `None`
pub fn score_match(source: &TitleFacts<'_>, target: &TitleFacts<'_>) -> Option<f64> {
    DEFAULT_SCORER.score(source, target)
}
