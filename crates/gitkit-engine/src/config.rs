//! Engine configuration
//!
//! Loaded once at startup and threaded into the provider explicitly. Values
//! come from defaults, then an optional TOML file, then `GITKIT_*`
//! environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3_600;

/// Settings that shape how the engine runs git.
///
/// # Example
///
/// ```
/// use gitkit_engine::EngineConfig;
///
/// let config = EngineConfig::from_toml_str("timeout_ms = 5000\ncommit_signing = true\n").unwrap();
/// assert_eq!(config.timeout_ms, 5000);
/// assert!(config.commit_signing);
/// assert_eq!(config.git_binary.to_str(), Some("git"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Program spawned for every operation
    pub git_binary: PathBuf,
    /// Wall-clock limit per process
    pub timeout_ms: u64,
    /// Limit per output stream
    pub max_buffer_bytes: usize,
    /// Sign commits and merges, falling back to unsigned on signing failure
    pub commit_signing: bool,
    /// TTL for working-directory entries set without one; `0` disables expiry
    pub session_ttl_secs: u64,
    /// Extra environment for every git process, applied over the defaults
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            commit_signing: false,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            env: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// Uses `path` if given, otherwise [`default_path`](Self::default_path)
    /// when that file exists, otherwise defaults. Environment overrides are
    /// applied last.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/gitkit/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gitkit").join("config.toml"))
    }

    /// Apply `GITKIT_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("GITKIT_GIT_BINARY") {
            self.git_binary = PathBuf::from(value);
        }
        if let Some(value) = lookup("GITKIT_TIMEOUT_MS") {
            self.timeout_ms = parse_env("GITKIT_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("GITKIT_MAX_BUFFER_BYTES") {
            self.max_buffer_bytes = parse_env("GITKIT_MAX_BUFFER_BYTES", &value)?;
        }
        if let Some(value) = lookup("GITKIT_COMMIT_SIGNING") {
            self.commit_signing = parse_env("GITKIT_COMMIT_SIGNING", &value)?;
        }
        if let Some(value) = lookup("GITKIT_SESSION_TTL_SECS") {
            self.session_ttl_secs = parse_env("GITKIT_SESSION_TTL_SECS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfig {
                message: "timeout_ms must be greater than zero".into(),
            });
        }
        if self.max_buffer_bytes == 0 {
            return Err(Error::InvalidConfig {
                message: "max_buffer_bytes must be greater than zero".into(),
            });
        }
        if self.git_binary.as_os_str().is_empty() {
            return Err(Error::InvalidConfig {
                message: "git_binary must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Default TTL for the working-directory store.
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| Error::InvalidConfig {
        message: format!("{key}={value:?}: {e}"),
    })
}
