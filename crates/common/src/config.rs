//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Fan-out configuration.
    #[serde(default)]
    pub fanout: FanOutConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration (job queue backend).
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
}

/// Fan-out dispatcher configuration.
///
/// The threshold partitions actors into two regimes: below it an activity is
/// pushed into every follower's feed at write time; at or above it nothing is
/// written and the activity is merged at read time instead.
#[derive(Debug, Clone, Deserialize)]
pub struct FanOutConfig {
    /// Follower count at or above which write-time fan-out is skipped.
    #[serde(default = "default_fanout_threshold")]
    pub threshold: u64,
    /// Followers fetched and inserted per page during fan-out.
    #[serde(default = "default_fanout_page_size")]
    pub page_size: u64,
    /// Upper bound on a single fan-out page, in seconds.
    #[serde(default = "default_fanout_page_timeout_secs")]
    pub page_timeout_secs: u64,
    /// Number of concurrent fan-out workers.
    #[serde(default = "default_fanout_workers")]
    pub workers: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            threshold: default_fanout_threshold(),
            page_size: default_fanout_page_size(),
            page_timeout_secs: default_fanout_page_timeout_secs(),
            workers: default_fanout_workers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_fanout_threshold() -> u64 {
    10_000
}

const fn default_fanout_page_size() -> u64 {
    500
}

const fn default_fanout_page_timeout_secs() -> u64 {
    10
}

const fn default_fanout_workers() -> usize {
    4
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PULSE_ENV`)
    /// 3. Environment variables with `PULSE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PULSE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fanout_defaults() {
        let fanout = FanOutConfig::default();
        assert_eq!(fanout.threshold, 10_000);
        assert_eq!(fanout.page_size, 500);
        assert_eq!(fanout.page_timeout_secs, 10);
        assert_eq!(fanout.workers, 4);
    }
}
