use log::{debug, info};
use std::sync::Once;
use std::time::Instant;

use crate::shared::domain::ProviderId;

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,kizuna=debug,diesel=warn,reqwest=warn,hyper=warn,tokio=warn";

/// Install `env_logger` once. `RUST_LOG` overrides the default filter.
///
/// Safe to call when the embedding application already installed a logger.
pub fn init_logger() {
    INIT.call_once(|| {
        let result = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(DEFAULT_FILTER),
        )
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init();

        match result {
            Ok(()) => info!("Logging initialized"),
            Err(e) => debug!("Logger already installed: {}", e),
        }
    });
}

/// One-line log formats shared across the engine
pub struct LogContext;

impl LogContext {
    /// A catalog HTTP call; `elapsed_ms` is `None` when the call is starting
    pub fn api_call(provider: ProviderId, endpoint: &str, status: &str, elapsed_ms: Option<u64>) {
        match elapsed_ms {
            Some(ms) => info!("API {} {} -> {} in {}ms", provider, endpoint, status, ms),
            None => debug!("API {} {} ({})", provider, endpoint, status),
        }
    }

    pub fn search_operation(query: &str, provider: ProviderId, results: Option<usize>) {
        match results {
            Some(count) => debug!("Search '{}' via {}: {} result(s)", query, provider, count),
            None => debug!("Search '{}' via {}", query, provider),
        }
    }

    pub fn cache_lookup(key: &str, hit: bool) {
        debug!("Match cache {}: {}", if hit { "hit" } else { "miss" }, key);
    }

    /// A request served by a lower-priority source than the one asked for
    pub fn fallback(title: &str, from: &str, to: &str, reason: &str) {
        info!("Fallback for '{}': {} -> {} ({})", title, from, to, reason);
    }

    pub fn performance_metric(operation: &str, duration_ms: u64, note: Option<&str>) {
        match note {
            Some(note) => info!("Timing: {} took {}ms ({})", operation, duration_ms, note),
            None => info!("Timing: {} took {}ms", operation, duration_ms),
        }
    }
}

/// Logs how long an operation took when finished
pub struct TimedOperation {
    start: Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting {}", operation);
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish_with_info(self, info: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, Some(info));
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger();
        init_logger();
    }

    #[test]
    fn test_timed_operation_reports_elapsed() {
        let timer = TimedOperation::new("unit");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.finish_with_info("done") >= 5);
    }
}
