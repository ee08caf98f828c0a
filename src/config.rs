//! Configuration module
//!
//! Settings are read from a TOML file, by default
//! `~/.config/list-pager/config.toml`:
//!
//! ```toml
//! [pagination]
//! items_per_page = 25
//! items_per_page_options = [10, 25, 50, 100]
//! initial_page = 1
//! enabled = true
//!
//! [database]
//! url = "sqlite://./list-pager.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::infrastructure::database::DatabaseConfig;
use crate::shared::ConfigError;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("list-pager")
        .join("config.toml")
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.pagination.check()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(io_err)
    }
}

/// Per-view pagination options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PaginationConfig {
    /// Rows per page.
    #[validate(range(min = 1, message = "items_per_page must be ≥ 1"))]
    pub items_per_page: u32,
    /// Page sizes a view may switch between, in increasing order.
    #[validate(length(min = 1, message = "items_per_page_options must not be empty"))]
    pub items_per_page_options: Vec<u32>,
    /// Page shown before the first count is known.
    #[validate(range(min = 1, message = "initial_page must be ≥ 1"))]
    pub initial_page: u32,
    /// When false the controller issues no fetch.
    pub enabled: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            items_per_page: 25,
            items_per_page_options: vec![10, 25, 50, 100],
            initial_page: 1,
            enabled: true,
        }
    }
}

impl PaginationConfig {
    /// Field validation plus the cross-field rules.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if self.items_per_page_options.contains(&0) {
            return Err(ConfigError::Invalid(
                "items_per_page_options must not contain 0".to_string(),
            ));
        }
        if !self.items_per_page_options.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid(
                "items_per_page_options must be strictly increasing".to_string(),
            ));
        }
        if !self.items_per_page_options.contains(&self.items_per_page) {
            return Err(ConfigError::Invalid(format!(
                "items_per_page {} is not one of {:?}",
                self.items_per_page, self.items_per_page_options
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `list_pager=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
