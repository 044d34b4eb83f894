// Episode/chapter aggregation and the orchestration façade

pub mod application;
pub mod domain;

pub use application::{AggregationOrchestrator, OrchestratorConfig, PageRequest};
pub use domain::{DataAggregator, StaleMatchDetector};
