use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str =
    "https://catalog-management-system-dev-ak3ogf6zea-uc.a.run.app/cms";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Runtime settings. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL; `/products` is appended to it.
    pub api_base_url: String,
    /// Quiet period before a control change triggers a fetch.
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    /// Choices offered by the category filter, in display order.
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            debounce_ms: 300,
            request_timeout_secs: 10,
            categories: vec![
                "HOUSE HOLD NEEDS".to_string(),
                "CLEANING & HOUSEHOLD".to_string(),
                "KITCHEN,GARDEN & PETS".to_string(),
            ],
        }
    }
}

impl Config {
    /// `<config dir>/catalog-browser/config.toml` for the current user.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "catalog", "catalog-browser")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Build the effective configuration.
    ///
    /// An explicit `path` must exist; otherwise the per-user default file is
    /// read when present. `api_url` (from `--api-url` or `CATALOG_API_URL`)
    /// wins over the file.
    pub fn load(path: Option<&Path>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };

        if let Some(url) = api_url {
            config.api_base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&self.api_base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot have path segments appended"));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
