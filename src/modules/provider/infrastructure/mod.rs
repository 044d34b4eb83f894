pub mod adapters;
pub mod http_client;

pub use adapters::{AniListAdapter, JikanAdapter, KitsuAdapter, SimklAdapter, TmdbAdapter};
pub use http_client::{RateLimitClient, RetryPolicy};
