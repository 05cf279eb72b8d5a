// ABOUTME: Configuration model for the tunnel pool: global settings and providers.
// ABOUTME: Handles config discovery, YAML parsing and validation with key paths.

mod error;
mod global;
mod provider;
mod raw;
mod validate;

pub use error::{ConfigError, ConfigErrorKind};
pub use global::{
    BalancePolicy, DEFAULT_PROJECT, DEFAULT_PROXY_IMAGE, DEFAULT_TUNNEL_PORT, GlobalSettings,
    HealthCheckConfig, LoggingConfig, ProxyConfig, ProxyMode, ProxyTimeouts,
};
pub use provider::ProviderSpec;

use nonempty::NonEmpty;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "tunnelfleet.yml";
pub const CONFIG_FILENAME_ALT: &str = "tunnelfleet.yaml";
pub const CONFIG_FILENAME_LEGACY: &str = "config.yml";

/// Validated configuration. Constructed once per invocation and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub global: GlobalSettings,
    /// Providers in declaration order.
    pub providers: NonEmpty<ProviderSpec>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // Parse untyped first so syntax errors are told apart from type errors.
        let document: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Malformed {
                message: e.to_string(),
            })?;

        if !document.is_mapping() {
            return Err(ConfigError::Malformed {
                message: "expected a mapping with `global_settings` and `vpn_providers`"
                    .to_string(),
            });
        }

        let raw: raw::RawConfig = serde_yaml::from_str(yaml).map_err(ConfigError::from_typed)?;
        validate::validate(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_yaml(&content)
    }

    /// Find the configuration file in `dir`.
    pub fn locate(dir: &Path) -> Result<PathBuf, ConfigError> {
        [CONFIG_FILENAME, CONFIG_FILENAME_ALT, CONFIG_FILENAME_LEGACY]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))
    }

    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&Self::locate(dir)?)
    }

    /// Number of tunnel containers the configuration expands to.
    pub fn total_instances(&self) -> u64 {
        self.providers
            .iter()
            .map(|p| u64::from(p.num_containers.get()))
            .sum()
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderSpec> {
        self.providers.iter().find(|p| p.name.as_str() == name)
    }
}
