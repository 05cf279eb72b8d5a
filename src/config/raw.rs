// ABOUTME: Loosely-typed mirror of the YAML document used before validation.
// ABOUTME: Required keys are optional here so their absence reports an exact key path.

use indexmap::IndexMap;
use serde::Deserialize;

use super::global::{LoggingConfig, ProxyConfig};
use crate::runtime::RuntimeType;

#[derive(Debug, Deserialize)]
pub(super) struct RawConfig {
    pub global_settings: Option<RawGlobal>,
    pub vpn_providers: Option<IndexMap<String, Option<RawProvider>>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawGlobal {
    pub proxy_port: Option<i64>,
    pub image: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub runtime: Option<RuntimeType>,
    #[serde(default)]
    pub proxy_image: Option<String>,
    #[serde(default)]
    pub tunnel_port: Option<i64>,
    #[serde(default)]
    pub optional_env: IndexMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawProvider {
    pub num_containers: Option<i64>,
    #[serde(default)]
    pub server_regions: Option<Vec<String>>,
    #[serde(default)]
    pub required_env: IndexMap<String, Option<String>>,
    #[serde(default)]
    pub optional_env: IndexMap<String, serde_yaml::Value>,
}
