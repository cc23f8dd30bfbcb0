use flowlens_normalizer::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_DETAIL_BODY_BYTES, DEFAULT_MAX_DROP_RATIO, NormalizerConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::store::StoreOptions;

/// Overrides `remote.base_url`
pub const URL_ENV_VAR: &str = "FLOWLENS_URL";

pub const DEFAULT_BASE_URL: &str = "https://flowlens-api.magentic.ai/flowlens";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Per-attempt deadline for a platform request
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Upper bound on pages walked by `list_flows`
    pub max_list_pages: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            max_list_pages: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSection {
    pub max_body_bytes: usize,
    /// Bound for bodies returned by `get_network_event_detail`
    pub max_detail_body_bytes: usize,
    pub max_drop_ratio: f64,
}

impl Default for NormalizerSection {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_detail_body_bytes: DEFAULT_MAX_DETAIL_BODY_BYTES,
            max_drop_ratio: DEFAULT_MAX_DROP_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub normalizer: NormalizerSection,
}

impl Config {
    /// Load configuration by priority:
    /// 1. Explicit path (must exist)
    /// 2. `<config_dir>/flowlens/config.toml` when present
    /// 3. Built-in defaults
    ///
    /// `FLOWLENS_URL` then overrides the base URL, and the result is validated.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from(path)?
            }
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(url) = std::env::var(URL_ENV_VAR)
            && !url.trim().is_empty()
        {
            config.remote.base_url = url.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flowlens").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.remote.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "remote.base_url must be http(s), got scheme '{}'",
                base.scheme()
            )));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(Error::Config(
                "remote.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(Error::Config(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.normalizer.max_drop_ratio) {
            return Err(Error::Config(format!(
                "normalizer.max_drop_ratio must be within [0, 1], got {}",
                self.normalizer.max_drop_ratio
            )));
        }
        if self.normalizer.max_body_bytes == 0 {
            return Err(Error::Config(
                "normalizer.max_body_bytes must be greater than 0".to_string(),
            ));
        }
        if self.normalizer.max_detail_body_bytes < self.normalizer.max_body_bytes {
            return Err(Error::Config(
                "normalizer.max_detail_body_bytes must not be smaller than normalizer.max_body_bytes"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            attempt_timeout: Duration::from_secs(self.remote.request_timeout_secs),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            retry: self.retry_policy(),
            max_list_pages: self.remote.max_list_pages,
        }
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            max_body_bytes: self.normalizer.max_body_bytes,
            max_detail_body_bytes: self.normalizer.max_detail_body_bytes,
            max_drop_ratio: self.normalizer.max_drop_ratio,
        }
    }
}
