// ABOUTME: Global settings applied to every generated artifact.
// ABOUTME: Proxy port and tunnel image plus logging and proxy tuning knobs.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::runtime::RuntimeType;
use crate::types::ImageRef;

pub const DEFAULT_PROJECT: &str = "tunnelfleet";
pub const DEFAULT_PROXY_IMAGE: &str = "haproxy:3.0";
pub const DEFAULT_TUNNEL_PORT: u16 = 8888;

#[derive(Debug, Clone)]
pub struct GlobalSettings {
    /// Port the proxy listens on and publishes to the host.
    pub proxy_port: u16,
    /// Tunnel image shared by every provider.
    pub image: ImageRef,
    /// Compose project name; scopes `list` and `down`.
    pub project: String,
    /// Explicit runtime; auto-detected when absent.
    pub runtime: Option<RuntimeType>,
    pub proxy_image: ImageRef,
    /// Port of the HTTP proxy inside each tunnel container.
    pub tunnel_port: u16,
    /// Optional-env defaults shared by all providers.
    pub optional_env: IndexMap<String, String>,
    pub logging: LoggingConfig,
    pub proxy: ProxyConfig,
}

/// json-file log rotation applied to every service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_max_size")]
    pub max_size: String,
    #[serde(default = "default_max_file")]
    pub max_file: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_file: default_max_file(),
        }
    }
}

fn default_max_size() -> String {
    "10m".to_string()
}

fn default_max_file() -> u32 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    #[default]
    Http,
    Tcp,
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyMode::Http => f.write_str("http"),
            ProxyMode::Tcp => f.write_str("tcp"),
        }
    }
}

/// Stateless distribution across backend members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum BalancePolicy {
    #[default]
    #[serde(rename = "roundrobin")]
    RoundRobin,
    #[serde(rename = "static-rr")]
    StaticRoundRobin,
}

impl fmt::Display for BalancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalancePolicy::RoundRobin => f.write_str("roundrobin"),
            BalancePolicy::StaticRoundRobin => f.write_str("static-rr"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub mode: ProxyMode,
    #[serde(default)]
    pub balance: BalancePolicy,
    #[serde(default)]
    pub timeouts: ProxyTimeouts,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
    #[serde(default)]
    pub stats_port: Option<u16>,
    #[serde(default = "default_maxconn")]
    pub maxconn: u32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            mode: ProxyMode::default(),
            balance: BalancePolicy::default(),
            timeouts: ProxyTimeouts::default(),
            health_check: HealthCheckConfig::default(),
            stats_port: None,
            maxconn: default_maxconn(),
        }
    }
}

fn default_maxconn() -> u32 {
    4096
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyTimeouts {
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect: Duration,
    #[serde(default = "default_session_timeout", with = "humantime_serde")]
    pub client: Duration,
    #[serde(default = "default_session_timeout", with = "humantime_serde")]
    pub server: Duration,
}

impl Default for ProxyTimeouts {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            client: default_session_timeout(),
            server: default_session_timeout(),
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(50)
}

/// Active health check declared for every backend member.
///
/// The probe targets the tunnel's own health server, which only answers 200
/// while the VPN connection is established.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckConfig {
    #[serde(default = "default_health_port")]
    pub port: u16,
    #[serde(default = "default_health_path")]
    pub path: String,
    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub interval: Duration,
    #[serde(default = "default_rise")]
    pub rise: u32,
    #[serde(default = "default_fall")]
    pub fall: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            port: default_health_port(),
            path: default_health_path(),
            interval: default_health_interval(),
            rise: default_rise(),
            fall: default_fall(),
        }
    }
}

fn default_health_port() -> u16 {
    9999
}

fn default_health_path() -> String {
    "/".to_string()
}

fn default_health_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_rise() -> u32 {
    2
}

fn default_fall() -> u32 {
    3
}
