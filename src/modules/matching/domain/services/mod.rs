pub mod confidence;
pub mod cross_provider_matcher;
pub mod similarity_strategy;
pub mod title_normalizer;

pub use confidence::{calculate_match_confidence, score_match, ConfidenceScorer, TitleFacts};
pub use cross_provider_matcher::{CrossProviderMatcher, MatchLookup, MatcherConfig};
pub use similarity_strategy::{
    HybridStrategy, JaroWinklerStrategy, LevenshteinStrategy, MaxStrategy, SimilarityStrategy,
    TokenOverlapStrategy,
};
pub use title_normalizer::{normalize_title, TitleNormalizer, TitleTransformation};
