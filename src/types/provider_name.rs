// ABOUTME: Validated VPN provider name used as a compose service prefix.
// ABOUTME: Keeps derived container names DNS-label sized and unambiguous.

use std::fmt;
use thiserror::Error;

/// Leaves room for the `-<replica>` suffix inside a 63 character DNS label.
pub const MAX_PROVIDER_NAME_LEN: usize = 48;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderNameError {
    #[error("provider name cannot be empty")]
    Empty,

    #[error("provider name exceeds maximum length of {MAX_PROVIDER_NAME_LEN} characters")]
    TooLong,

    #[error("provider name must start with a letter or digit")]
    BadStart,

    #[error("provider name cannot end with '-' or '_'")]
    BadEnd,

    #[error("provider name must be lowercase")]
    NotLowercase,

    #[error("invalid character in provider name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(value: &str) -> Result<Self, ProviderNameError> {
        if value.is_empty() {
            return Err(ProviderNameError::Empty);
        }

        if value.len() > MAX_PROVIDER_NAME_LEN {
            return Err(ProviderNameError::TooLong);
        }

        if value.starts_with(['-', '_']) {
            return Err(ProviderNameError::BadStart);
        }

        if value.ends_with(['-', '_']) {
            return Err(ProviderNameError::BadEnd);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ProviderNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(ProviderNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value the tunnel image expects in `VPN_SERVICE_PROVIDER`.
    pub fn service_provider_label(&self) -> String {
        self.0.replace('_', " ")
    }

    /// Prefix for provider-scoped credential variables: `private-vpn` → `PRIVATE_VPN`.
    pub fn env_prefix(&self) -> String {
        self.0.to_ascii_uppercase().replace('-', "_")
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_underscored_names() {
        let name = ProviderName::new("private_internet_access").unwrap();
        assert_eq!(name.service_provider_label(), "private internet access");
        assert_eq!(name.env_prefix(), "PRIVATE_INTERNET_ACCESS");
    }

    #[test]
    fn env_prefix_replaces_hyphens() {
        let name = ProviderName::new("proton-vpn").unwrap();
        assert_eq!(name.env_prefix(), "PROTON_VPN");
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ProviderName::new(""), Err(ProviderNameError::Empty));
        assert_eq!(ProviderName::new("-pia"), Err(ProviderNameError::BadStart));
        assert_eq!(ProviderName::new("pia_"), Err(ProviderNameError::BadEnd));
        assert_eq!(ProviderName::new("PIA"), Err(ProviderNameError::NotLowercase));
        assert_eq!(
            ProviderName::new("pia.vpn"),
            Err(ProviderNameError::InvalidChar('.'))
        );
        assert_eq!(
            ProviderName::new(&"a".repeat(MAX_PROVIDER_NAME_LEN + 1)),
            Err(ProviderNameError::TooLong)
        );
    }
}
