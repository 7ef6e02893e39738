//! Configuration management for the FitTrack client
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FT__)

use anyhow::Result;
use chrono::Duration;
use fittrack_shared::{FitnessGoal, ReversalPolicy, LOCK_WINDOW_HOURS};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Persisted client state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_file: PathBuf,
}

/// Tracking rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Whether a completed exercise may be unmarked after its lock window
    pub reversal_policy: ReversalPolicy,
    pub lock_window_hours: i64,
    /// Serve placeholder plans when a read fails
    pub placeholder_fallback: bool,
    /// Ask the backend for streaks before computing them locally
    pub prefer_server_streak: bool,
    /// Goal used for plan generation when the user has none on record
    pub default_goal: FitnessGoal,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            reversal_policy: ReversalPolicy::Never,
            lock_window_hours: LOCK_WINDOW_HOURS,
            placeholder_fallback: true,
            prefer_server_streak: false,
            default_goal: FitnessGoal::GeneralFitness,
        }
    }
}

impl TrackingConfig {
    pub fn lock_window(&self) -> Duration {
        Duration::hours(self.lock_window_hours)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                timeout_secs: 10,
                user_agent: format!("fittrack/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                state_file: PathBuf::from(".fittrack/state.json"),
            },
            tracking: TrackingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FT__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&ClientConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., FT__API__BASE_URL=https://api.example.com sets api.base_url
            .add_source(config::Environment::with_prefix("FT").separator("__"))
            .build()?;

        let config: ClientConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            anyhow::bail!("api.base_url must be an http(s) URL, got {}", self.api.base_url);
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be positive");
        }
        if self.tracking.lock_window_hours < 0 {
            anyhow::bail!("tracking.lock_window_hours cannot be negative");
        }
        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
