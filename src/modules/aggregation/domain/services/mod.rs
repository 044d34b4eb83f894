pub mod data_aggregator;
pub mod stale_match_detector;

pub use data_aggregator::{DataAggregator, FetchTarget, EPISODE_PRIORITY};
pub use stale_match_detector::StaleMatchDetector;
