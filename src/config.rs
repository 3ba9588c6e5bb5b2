// src/config.rs
//! Checker configuration.
//!
//! Read from a TOML file; every key is optional and falls back to the
//! `Default` impl, so a config file only needs the values it changes:
//!
//! ```toml
//! max_parent_depth = 32
//! memoize_failures = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default bound on parent-chain walks in `check_parent`.
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// How many parent links `check_parent` follows before giving up.
    pub max_parent_depth: usize,
    /// Cache failed structural-conformance checks as negative entries.
    pub memoize_failures: bool,
    /// Reject a bare `any` actual argument where a concrete type is expected.
    pub strict_any_arguments: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            memoize_failures: false,
            strict_any_arguments: false,
        }
    }
}

/// Failure to read or parse a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("max_parent_depth must be at least 1")]
    ZeroDepth,
}

impl CheckerConfig {
    /// Parse a TOML string, using defaults for omitted keys.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: CheckerConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file on disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded checker config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parent_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}
