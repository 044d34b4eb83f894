mod match_query;
mod provider_match;

pub use match_query::{MatchCacheKey, MatchQuery};
pub use provider_match::{MatchSet, ProviderMatch};
