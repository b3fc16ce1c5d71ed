//! Portal configuration
//!
//! Loaded from TOML; every field is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! commit_delay_ms = 0
//! transition_policy = "strict"
//!
//! [demo_account]
//! enabled = false
//!
//! [catalog]
//! "Cardiología" = ["Dr. Elena Torres"]
//! ```

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::state_machine::TransitionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Portal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Delay before an appointment request is committed, in milliseconds
    pub commit_delay_ms: u64,
    /// Delay before login and registration answer, in milliseconds
    pub auth_delay_ms: u64,
    /// State machine enforcement
    pub transition_policy: TransitionPolicy,
    /// Built-in account accepted before the registered directory
    pub demo_account: DemoAccount,
    /// Specialties and practitioners offered
    pub catalog: Catalog,
}

impl PortalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every artificial delay removed
    #[inline]
    #[must_use]
    pub fn immediate() -> Self {
        Self::default().with_commit_delay(Duration::ZERO).with_auth_delay(Duration::ZERO)
    }

    /// With commit delay
    #[inline]
    #[must_use]
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay_ms = duration_ms(delay);
        self
    }

    /// With login/registration delay
    #[inline]
    #[must_use]
    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay_ms = duration_ms(delay);
        self
    }

    /// With transition policy
    #[inline]
    #[must_use]
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// With catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// With demo account
    #[inline]
    #[must_use]
    pub fn with_demo_account(mut self, demo: DemoAccount) -> Self {
        self.demo_account = demo;
        self
    }

    /// Commit delay as a `Duration`
    #[inline]
    #[must_use]
    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    /// Login/registration delay as a `Duration`
    #[inline]
    #[must_use]
    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` if the result fails [`Self::validate`]
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - see [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded portal configuration");
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the catalog is empty or has a blank
    /// specialty, or if the enabled demo account has a blank field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::Invalid("catalog has no specialties".into()));
        }
        if self.catalog.specialties().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("catalog has a blank specialty".into()));
        }
        let demo = &self.demo_account;
        if demo.enabled
            && (demo.cc.trim().is_empty()
                || demo.secret.is_empty()
                || demo.display_name.trim().is_empty())
        {
            return Err(ConfigError::Invalid("demo account is incomplete".into()));
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            commit_delay_ms: 500,
            auth_delay_ms: 600,
            transition_policy: TransitionPolicy::Strict,
            demo_account: DemoAccount::default(),
            catalog: Catalog::default(),
        }
    }
}

/// Built-in account for demonstrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoAccount {
    /// Whether the account is accepted at all
    pub enabled: bool,
    /// Citizen code used to log in
    pub cc: String,
    /// Clear-text secret
    pub secret: String,
    /// Name shown once logged in
    pub display_name: String,
}

impl DemoAccount {
    /// Disabled account
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for DemoAccount {
    fn default() -> Self {
        Self {
            enabled: true,
            cc: "admin123".to_string(),
            secret: "demo1234".to_string(),
            display_name: "Ana García".to_string(),
        }
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
