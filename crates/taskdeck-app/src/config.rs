//! Client configuration file and environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use taskdeck_core::{FilterCriteria, SortDirection, SortKey};

const CONFIG_DIR: &str = "taskdeck";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "token";

/// Environment variable overriding `[api] base_url`.
pub const API_URL_ENV: &str = "TASKDECK_API_URL";

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Top-level client configuration loaded from `taskdeck/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote service settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Initial ordering of the task list.
    #[serde(default)]
    pub view: ViewConfig,
    /// Token persistence.
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[api]` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the task service, e.g. `http://localhost:8080`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

/// `[view]` block: initial ordering of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Sort key.
    #[serde(default)]
    pub sort_by: SortKey,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

/// `[session]` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where the bearer token is kept between runs.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

/// Returns the default configuration file path.
///
/// On Linux: `~/.config/taskdeck/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl AppConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing file yields the defaults. `TASKDECK_API_URL` wins over the file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed, or the resulting base URL is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Read one configuration file. A missing file yields the defaults.
    ///
    /// # Errors
    /// Fails on I/O errors, malformed TOML or an invalid base URL.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides looked up through `lookup`.
    ///
    /// # Errors
    /// Fails when the overriding base URL is invalid.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_owned();
            self.validate()?;
        }
        Ok(self)
    }

    /// Criteria the task list starts from.
    #[must_use]
    pub fn initial_criteria(&self) -> FilterCriteria {
        FilterCriteria::default().sorted_by(self.view.sort_by, self.view.direction)
    }

    /// File holding the bearer token between runs.
    #[must_use]
    pub fn token_path(&self) -> Option<PathBuf> {
        self.session
            .token_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(TOKEN_FILE)))
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            bail!("api base_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api base_url '{url}' must start with http:// or https://");
        }
        Ok(())
    }
}
