// Shared kernel used by every module

pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod utils;

pub use config::EngineConfig;
pub use infrastructure::database::Database;
