//! Configuration error types
//!
//! The simulation itself never fails: bad runtime input degrades to a no-op.
//! Everything that can go wrong is caught once, while loading an arena.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A by-name weapon reference that matches no `[[weapons]]` entry
    #[error("unknown weapon '{name}' referenced by {context}")]
    UnknownWeapon { name: String, context: String },

    #[error("weapon '{weapon}' has no projectile prototype")]
    MissingProjectile { weapon: String },

    #[error("{field} = {value} is invalid: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: &'static str,
    },
}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl ToString, reason: &'static str) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason,
        }
    }
}
