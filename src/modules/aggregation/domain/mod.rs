pub mod services;

pub use services::{DataAggregator, StaleMatchDetector};
