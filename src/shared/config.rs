use serde::Deserialize;
use std::time::Duration;

/// Prefix of every environment variable read by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "KIZUNA_";

/// Special cache path selecting the non-persistent store.
pub const IN_MEMORY_CACHE: &str = ":memory:";

/// Engine configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// TMDB v3 API key; TMDB is not registered without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Simkl client id; Simkl is not registered without it
    #[serde(default)]
    pub simkl_client_id: Option<String>,

    /// SQLite file backing the match cache, or `:memory:`
    #[serde(default = "default_match_cache_path")]
    pub match_cache_path: String,

    /// Minimum confidence for a candidate to enter a match set
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    /// Minimum confidence for borrowing artwork from another catalog
    #[serde(default = "default_backfill_threshold")]
    pub backfill_threshold: f64,

    /// Per-provider search timeout used by the matcher
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Per-provider timeout for episode/chapter fetches
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on concurrent provider searches per lookup
    #[serde(default = "default_max_concurrent_searches")]
    pub max_concurrent_searches: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_match_cache_path() -> String {
    "kizuna_match_cache.sqlite3".to_string()
}

fn default_acceptance_threshold() -> f64 {
    0.75
}

fn default_backfill_threshold() -> f64 {
    0.85
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_max_concurrent_searches() -> usize {
    4
}

fn default_user_agent() -> String {
    "kizuna/0.1 (metadata aggregation)".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            simkl_client_id: None,
            match_cache_path: default_match_cache_path(),
            acceptance_threshold: default_acceptance_threshold(),
            backfill_threshold: default_backfill_threshold(),
            search_timeout_secs: default_search_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_searches: default_max_concurrent_searches(),
            user_agent: default_user_agent(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `KIZUNA_*` environment variables (and `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::prefixed(ENV_PREFIX)
            .from_env::<EngineConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Build from explicit key/value pairs (keys carry the `KIZUNA_` prefix)
    pub fn from_pairs<I>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, EngineConfig>(pairs)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn uses_in_memory_cache(&self) -> bool {
        self.match_cache_path == IN_MEMORY_CACHE
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("acceptance_threshold", self.acceptance_threshold),
            ("backfill_threshold", self.backfill_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }

        if self.search_timeout_secs == 0 || self.fetch_timeout_secs == 0 {
            return Err("timeouts must be > 0".to_string());
        }

        if self.max_concurrent_searches == 0 {
            return Err("max_concurrent_searches must be > 0".to_string());
        }

        if self.match_cache_path.trim().is_empty() {
            return Err("match_cache_path must not be empty".to_string());
        }

        Ok(())
    }
}

/// Builder for EngineConfig to make test setup easier
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tmdb_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.tmdb_api_key = Some(key.into());
        self
    }

    pub fn simkl_client_id(mut self, id: impl Into<String>) -> Self {
        self.config.simkl_client_id = Some(id.into());
        self
    }

    pub fn match_cache_path(mut self, path: impl Into<String>) -> Self {
        self.config.match_cache_path = path.into();
        self
    }

    pub fn acceptance_threshold(mut self, threshold: f64) -> Self {
        self.config.acceptance_threshold = threshold;
        self
    }

    pub fn backfill_threshold(mut self, threshold: f64) -> Self {
        self.config.backfill_threshold = threshold;
        self
    }

    pub fn search_timeout_secs(mut self, secs: u64) -> Self {
        self.config.search_timeout_secs = secs;
        self
    }

    pub fn max_concurrent_searches(mut self, max: usize) -> Self {
        self.config.max_concurrent_searches = max;
        self
    }

    pub fn build(self) -> Result<EngineConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_apply_when_env_is_empty() {
        let config = EngineConfig::from_pairs(Vec::new()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_prefixed_values_are_read() {
        let config = EngineConfig::from_pairs(vec![
            pair("KIZUNA_TMDB_API_KEY", "abc"),
            pair("KIZUNA_ACCEPTANCE_THRESHOLD", "0.8"),
            pair("KIZUNA_MATCH_CACHE_PATH", ":memory:"),
            pair("UNRELATED", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.tmdb_api_key.as_deref(), Some("abc"));
        assert_eq!(config.acceptance_threshold, 0.8);
        assert!(config.uses_in_memory_cache());
        assert!(config.simkl_client_id.is_none());
    }

    #[test]
    fn test_threshold_out_of_range_is_invalid() {
        let result = EngineConfigBuilder::new().acceptance_threshold(1.5).build();
        assert!(result.unwrap_err().contains("acceptance_threshold"));
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let result = EngineConfigBuilder::new().max_concurrent_searches(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_chaining() {
        let config = EngineConfigBuilder::new()
            .tmdb_api_key("key")
            .simkl_client_id("client")
            .backfill_threshold(0.9)
            .search_timeout_secs(3)
            .build()
            .unwrap();

        assert_eq!(config.backfill_threshold, 0.9);
        assert_eq!(config.search_timeout(), Duration::from_secs(3));
    }
}
