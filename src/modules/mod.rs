pub mod aggregation;
pub mod matching;
pub mod media;
pub mod provider;
