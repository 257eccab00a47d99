// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{MattermostError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Mattermost server URL, e.g. https://chat.example.com
    #[serde(default)]
    pub url: Option<String>,

    /// Bot or personal access token
    #[serde(default)]
    pub token: Option<String>,

    /// Team used when a tool call does not name one
    #[serde(default)]
    pub team_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_min_request_interval_ms() -> u64 {
    100
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            team_id: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_enabled: default_cache_enabled(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("team_id", &self.team_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("base_backoff_ms", &self.base_backoff_ms)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_enabled", &self.cache_enabled)
            .finish()
    }
}

impl Config {
    /// Layers defaults, an optional TOML file and `MATTERMOST_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("MATTERMOST")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| MattermostError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MattermostError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(MattermostError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.url {
            Validator::validate_url(url)
                .map_err(|e| MattermostError::Config(e.to_string()))?;
        }

        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
            && self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
