// ABOUTME: Credential slots: unresolved placeholders and resolved secrets.
// ABOUTME: Distinct types so an unresolved slot can never reach a rendered artifact.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("credential placeholder cannot be empty")]
pub struct EmptyPlaceholder;

/// An unresolved credential slot such as `USERNAME`.
///
/// Placeholders name where a value comes from; they never carry the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder(String);

impl Placeholder {
    pub fn new(value: &str) -> Result<Self, EmptyPlaceholder> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EmptyPlaceholder);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved credential value.
///
/// `Debug` is redacted so secrets do not leak through tracing or error output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Only artifact renderers should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_trimmed_and_non_empty() {
        assert_eq!(Placeholder::new("  USERNAME ").unwrap().as_str(), "USERNAME");
        assert_eq!(Placeholder::new("   "), Err(EmptyPlaceholder));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
