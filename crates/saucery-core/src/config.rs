//! Configuration management for saucery
//!
//! Credentials and job metadata shared by every worker. The configuration is
//! loaded once before the run (file, then environment) and never mutated.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Credentials, Result, SauceError, SessionId};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "saucery.toml";

pub const ENV_USER: &str = "SAUCE_USERNAME";
pub const ENV_ACCESS_KEY: &str = "SAUCE_ACCESS_KEY";
pub const ENV_BUILD_ID: &str = "SAUCE_BUILD_ID";
pub const ENV_BUILD_ID_FALLBACK: &str = "BUILD_ID";
pub const ENV_BASE_URL: &str = "SAUCE_BASE_URL";

/// Sauce Labs reporting configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SauceConfig {
    /// Sauce Labs user name
    #[serde(default)]
    pub user: String,

    /// Sauce Labs access key
    #[serde(default)]
    pub access_key: String,

    /// Build identifier attached to every job
    #[serde(default)]
    pub build_id: Option<String>,

    /// Tags attached to every job
    #[serde(default)]
    pub tags: Vec<String>,

    /// REST API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout; unset leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://saucelabs.com".to_string()
}

impl SauceConfig {
    pub fn new(user: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            access_key: access_key.into(),
            ..Self::default()
        }
    }

    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load configuration from `path`, or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| SauceError::Config(format!("Failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Write a default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| SauceError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are ignored. `SAUCE_BUILD_ID` wins over `BUILD_ID`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(user) = get(ENV_USER) {
            self.user = user;
        }
        if let Some(key) = get(ENV_ACCESS_KEY) {
            self.access_key = key;
        }
        if let Some(build) = get(ENV_BUILD_ID).or_else(|| get(ENV_BUILD_ID_FALLBACK)) {
            self.build_id = Some(build);
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        self
    }

    /// Check that credentials are present
    pub fn validate(&self) -> Result<()> {
        if self.user.is_empty() {
            return Err(SauceError::MissingCredential(ENV_USER));
        }
        if self.access_key.is_empty() {
            return Err(SauceError::MissingCredential(ENV_ACCESS_KEY));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            access_key: self.access_key.clone(),
        }
    }

    /// Job status endpoint for a session
    pub fn job_url(&self, session: &SessionId) -> String {
        format!(
            "{}/rest/v1/{}/jobs/{}",
            self.base_url.trim_end_matches('/'),
            self.user,
            session
        )
    }

    /// Copy safe to print, with the access key masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.access_key.is_empty() {
            copy.access_key = "<redacted>".to_string();
        }
        copy
    }
}

impl Default for SauceConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            access_key: String::new(),
            build_id: None,
            tags: Vec::new(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for SauceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SauceConfig")
            .field("user", &self.user)
            .field("access_key", &"<redacted>")
            .field("build_id", &self.build_id)
            .field("tags", &self.tags)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
