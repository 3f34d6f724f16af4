//! Configuration file loading
//!
//! Configuration is stored in TOML format with support for multiple named
//! profiles:
//!
//! ```toml
//! default_profile = "prod"
//!
//! [profiles.prod]
//! email = "etl@example.com"
//! password = "${FIREBOLT_PROD_PASSWORD}"
//! database = "warehouse"
//! engine_name = "warehouse_general_purpose"
//!
//! [profiles.staging]
//! api_url = "${FIREBOLT_STAGING_URL:-https://api.staging.firebolt.io}"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named explicitly
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection defaults for one account/environment
#[derive(Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// API origin override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_name: Option<String>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("database", &self.database)
            .field("engine_name", &self.engine_name)
            .finish()
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields an empty configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Get the platform config file path (`.../fireboltctl/config.toml`)
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("io", "firebolt", "fireboltctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Pick the profile to use.
    ///
    /// An explicitly named profile must exist. Without a name the
    /// `default_profile` is used if set; otherwise no profile applies.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<Option<&Profile>> {
        let Some(name) = name.or(self.default_profile.as_deref()) else {
            return Ok(None);
        };

        self.profiles
            .get(name)
            .map(Some)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Expand `${VAR}` and `${VAR:-default}` in configuration content.
    ///
    /// Unset variables without a default are left as written.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
