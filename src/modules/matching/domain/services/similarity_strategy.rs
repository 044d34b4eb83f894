use std::collections::HashSet;
use strsim::{jaro_winkler, normalized_levenshtein};

/// Strategy for calculating similarity between two strings
///
/// This trait enables different similarity algorithms to be used interchangeably,
/// making the system testable and extensible.
pub trait SimilarityStrategy: Send + Sync {
    /// Calculate similarity between query and target
    ///
    /// Returns a value between 0.0 (completely different) and 1.0 (identical)
    fn calculate(&self, query: &str, target: &str) -> f64;

    /// Get the name of this strategy for logging/debugging
    fn name(&self) -> &'static str;
}

/// Jaro-Winkler similarity strategy
///
/// Particularly good for short strings and names (like anime titles).
/// Gives more weight to matching prefixes.
#[derive(Debug, Clone)]
pub struct JaroWinklerStrategy;

impl SimilarityStrategy for JaroWinklerStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        jaro_winkler(query, target)
    }

    fn name(&self) -> &'static str {
        "JaroWinkler"
    }
}

/// Normalized Levenshtein similarity strategy
#[derive(Debug, Clone)]
pub struct LevenshteinStrategy;

impl SimilarityStrategy for LevenshteinStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        normalized_levenshtein(query, target)
    }

    fn name(&self) -> &'static str {
        "Levenshtein"
    }
}

/// Shared words over the larger word set.
///
/// Catches reordered titles ("Titan Attack" / "Attack Titan") that
/// character-level metrics undervalue.
#[derive(Debug, Clone)]
pub struct TokenOverlapStrategy;

impl SimilarityStrategy for TokenOverlapStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        let query_tokens: HashSet<&str> = query.split_whitespace().collect();
        let target_tokens: HashSet<&str> = target.split_whitespace().collect();
        let larger = query_tokens.len().max(target_tokens.len());
        if larger == 0 {
            return 0.0;
        }

        query_tokens.intersection(&target_tokens).count() as f64 / larger as f64
    }

    fn name(&self) -> &'static str {
        "TokenOverlap"
    }
}

/// Hybrid strategy that combines multiple strategies with weighted average
pub struct HybridStrategy {
    strategies: Vec<(Box<dyn SimilarityStrategy>, f64)>,
}

impl HybridStrategy {
    /// Create a new hybrid strategy
    ///
    /// # Panics
    /// Panics if weights don't sum to approximately 1.0
    pub fn new(strategies: Vec<(Box<dyn SimilarityStrategy>, f64)>) -> Self {
        let weight_sum: f64 = strategies.iter().map(|(_, w)| w).sum();
        assert!(
            (weight_sum - 1.0).abs() < 0.01,
            "Strategy weights must sum to 1.0, got {}",
            weight_sum
        );
        Self { strategies }
    }

    /// Jaro-Winkler (70%) + Levenshtein (30%)
    pub fn default_hybrid() -> Self {
        Self::new(vec![
            (Box::new(JaroWinklerStrategy), 0.7),
            (Box::new(LevenshteinStrategy), 0.3),
        ])
    }
}

impl SimilarityStrategy for HybridStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        self.strategies
            .iter()
            .map(|(strategy, weight)| strategy.calculate(query, target) * weight)
            .sum()
    }

    fn name(&self) -> &'static str {
        "Hybrid"
    }
}

/// Best of several strategies
pub struct MaxStrategy {
    strategies: Vec<Box<dyn SimilarityStrategy>>,
}

impl MaxStrategy {
    pub fn new(strategies: Vec<Box<dyn SimilarityStrategy>>) -> Self {
        Self { strategies }
    }

    /// Title similarity: the hybrid edit-distance score or token overlap, whichever is larger
    pub fn title_similarity() -> Self {
        Self::new(vec![
            Box::new(HybridStrategy::default_hybrid()),
            Box::new(TokenOverlapStrategy),
        ])
    }
}

impl SimilarityStrategy for MaxStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        if query.is_empty() || target.is_empty() {
            return 0.0;
        }
        if query == target {
            return 1.0;
        }

        self.strategies
            .iter()
            .map(|strategy| strategy.calculate(query, target))
            .fold(0.0, f64::max)
            .clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "Max"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaro_winkler_similar_anime_titles() {
        let similarity = JaroWinklerStrategy.calculate("naruto", "naruto shippuden");
        assert!(similarity > 0.7);
    }

    #[test]
    fn test_levenshtein_typo_detection() {
        let similarity = LevenshteinStrategy.calculate("attack on titan", "atack on titan");
        assert!(similarity > 0.9);
    }

    #[test]
    fn test_token_overlap_ignores_order() {
        let similarity = TokenOverlapStrategy.calculate("titan on attack", "attack on titan");
        assert_eq!(similarity, 1.0);
        assert_eq!(TokenOverlapStrategy.calculate("", ""), 0.0);
        assert_eq!(TokenOverlapStrategy.calculate("one piece", "one punch man"), 1.0 / 3.0);
    }

    #[test]
    fn test_hybrid_combines_strengths() {
        let strategy = HybridStrategy::default_hybrid();
        let similarity = strategy.calculate("naruto", "naruta");

        let expected = 0.7 * JaroWinklerStrategy.calculate("naruto", "naruta")
            + 0.3 * LevenshteinStrategy.calculate("naruto", "naruta");
        assert!((similarity - expected).abs() < 0.001);
    }

    #[test]
    #[should_panic(expected = "Strategy weights must sum to 1.0")]
    fn test_hybrid_invalid_weights() {
        HybridStrategy::new(vec![
            (Box::new(JaroWinklerStrategy), 0.5),
            (Box::new(LevenshteinStrategy), 0.3),
        ]);
    }

    #[test]
    fn test_title_similarity_takes_the_larger_score() {
        let strategy = MaxStrategy::title_similarity();

        assert_eq!(strategy.calculate("naruto", "naruto"), 1.0);
        assert_eq!(strategy.calculate("", "naruto"), 0.0);

        let reordered = strategy.calculate("titan on attack", "attack on titan");
        assert_eq!(reordered, 1.0);

        let unrelated = strategy.calculate("bleach", "one piece");
        assert!(unrelated < 0.6);
    }
}
