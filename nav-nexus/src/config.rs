//! # Router configuration
//!
//! Defaults suit an interactive UI. A host may override them from a TOML
//! table; every key is optional:
//!
//! ```toml
//! expiry_ms = 300
//! on_conflict = "reject"
//! ```

use crate::error::{InvalidConfigSnafu, ReadConfigSnafu, Result};
use log::debug;
use serde::Deserialize;
use snafu::ResultExt;
use std::path::Path;
use std::time::Duration;

/// How long an active route may go without progress before it is abandoned.
pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(300);

/// What `navigate` does when a route is requested while another is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Treat the call as a programming error and panic.
    #[default]
    Abort,
    /// Return [`Error::RouteInProgress`](crate::Error::RouteInProgress) and keep the active route.
    Reject,
}

/// Sparse on-disk form; missing keys fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    expiry_ms: Option<u64>,
    on_conflict: Option<ConflictPolicy>,
}

/// Tunables of a [`Router`](crate::Router).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    pub expiry: Duration,
    pub on_conflict: ConflictPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_EXPIRY,
            on_conflict: ConflictPolicy::default(),
        }
    }
}

impl RouterConfig {
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    /// Parse a TOML document, filling absent keys with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(source).context(InvalidConfigSnafu)?;
        let defaults = Self::default();
        Ok(Self {
            expiry: raw
                .expiry_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.expiry),
            on_conflict: raw.on_conflict.unwrap_or(defaults.on_conflict),
        })
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        let config = Self::from_toml_str(&source)?;
        debug!("Loaded router config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
