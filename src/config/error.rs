// ABOUTME: Configuration error type with a kind and the offending key path.
// ABOUTME: Distinguishes unreadable, malformed, missing and invalid configuration.

use std::path::PathBuf;

/// Coarse classification of configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    NotFound,
    Unreadable,
    Malformed,
    MissingField,
    InvalidValue,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found in {0}")]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed configuration: {message}")]
    Malformed { message: String },

    #[error("missing required field `{path}`")]
    MissingField { path: String },

    #[error("invalid value for `{path}`: {message}")]
    InvalidValue { path: String, message: String },
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::NotFound(_) => ConfigErrorKind::NotFound,
            ConfigError::Unreadable { .. } => ConfigErrorKind::Unreadable,
            ConfigError::Malformed { .. } => ConfigErrorKind::Malformed,
            ConfigError::MissingField { .. } => ConfigErrorKind::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorKind::InvalidValue,
        }
    }

    /// Dotted key path of the offending entry, when the failure is tied to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { path } | ConfigError::InvalidValue { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    pub(crate) fn missing(path: impl Into<String>) -> Self {
        ConfigError::MissingField { path: path.into() }
    }

    pub(crate) fn invalid(path: impl Into<String>, message: impl ToString) -> Self {
        ConfigError::InvalidValue {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Map a typed deserialization failure. serde_yaml prefixes nested errors
    /// with their dotted path (`vpn_providers.pia.num_containers: invalid type ...`).
    pub(crate) fn from_typed(err: serde_yaml::Error) -> Self {
        let message = err.to_string();
        match message.split_once(": ") {
            Some((path, rest)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
                ConfigError::invalid(path, rest)
            }
            _ => ConfigError::invalid("(document)", message),
        }
    }
}
