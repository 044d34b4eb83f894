pub mod dto;
pub mod orchestrator;

pub use dto::PageRequest;
pub use orchestrator::{AggregationOrchestrator, OrchestratorConfig};
