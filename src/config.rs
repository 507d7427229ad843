//! Client configuration
//!
//! Resolution order, later layers win:
//!
//! 1. built-in defaults (`http://localhost:8000`, 30 s)
//! 2. YAML file (`--config` or `CLAIMGUARD_CONFIG`)
//! 3. environment (`CLAIMGUARD_API_URL`, `CLAIMGUARD_TIMEOUT_SECS`), with `.env` loaded first
//! 4. command line flags (applied by the binary)
//!
//! ```yaml
//! base_url: http://scoring.internal:8000
//! timeout_secs: 15
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG_PATH: &str = "CLAIMGUARD_CONFIG";
pub const ENV_API_URL: &str = "CLAIMGUARD_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CLAIMGUARD_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prediction Service root, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Per-request timeout; also bounds each page's single outstanding call
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Read a YAML config file. Keys that are absent keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then file (explicit path or `CLAIMGUARD_CONFIG`), then environment.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let file = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

        let mut config = match file {
            Some(path) => {
                tracing::debug!("Reading client config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_timeout(&raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }

    /// Parsed base URL. Must be able to take path segments (`http(s)://...`).
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::UnusableUrl(self.base_url.clone()));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
