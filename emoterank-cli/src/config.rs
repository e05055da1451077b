use std::path::{Path, PathBuf};

use emotes::catalog::SEVENTV_GQL_URL;
use emotes::{ReportLinks, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

const CONFIG_DIR: &str = "emoterank";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from the TOML config file.
///
/// Every field has a default, so a missing or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 7TV GraphQL endpoint
    pub catalog_endpoint: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    pub report: ReportLinks,
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_endpoint: SEVENTV_GQL_URL.to_string(),
            request_timeout_secs: 30,
            report: ReportLinks::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl AppConfig {
    /// `<config_dir>/emoterank/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::configuration(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!(file = %path.display(), "Loading config");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Overwrite the config file with defaults.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().ok_or_else(|| {
                AppError::configuration("could not determine the user config directory")
            })?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::default().show()?)?;
        Ok(path)
    }

    /// Effective settings as TOML.
    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog_endpoint.trim().is_empty() {
            return Err(AppError::configuration("catalog_endpoint must not be empty"));
        }
        reqwest::Url::parse(&self.catalog_endpoint).map_err(|e| {
            AppError::configuration(format!(
                "catalog_endpoint '{}' is not a valid URL: {e}",
                self.catalog_endpoint
            ))
        })?;
        if self.request_timeout_secs == 0 {
            return Err(AppError::configuration(
                "request_timeout_secs must be greater than 0",
            ));
        }
        if let ScoringConfig::Decay { decay_rate } = self.scoring
            && !(decay_rate.is_finite() && decay_rate > 0.0)
        {
            return Err(AppError::configuration(format!(
                "scoring.decay_rate must be a positive number, got {decay_rate}"
            )));
        }
        Ok(())
    }
}
