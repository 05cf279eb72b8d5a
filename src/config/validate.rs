// ABOUTME: Conversion of the raw YAML mirror into the validated configuration model.
// ABOUTME: Every rejection cites the dotted key path of the offending entry.

use indexmap::IndexMap;
use nonempty::NonEmpty;
use std::num::NonZeroU32;

use super::error::ConfigError;
use super::global::{
    DEFAULT_PROJECT, DEFAULT_PROXY_IMAGE, DEFAULT_TUNNEL_PORT, GlobalSettings, ProxyConfig,
};
use super::provider::ProviderSpec;
use super::raw::{RawConfig, RawGlobal, RawProvider};
use super::Config;
use crate::types::{ImageRef, Placeholder, ProviderName};

pub(super) fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
    let global = raw
        .global_settings
        .ok_or_else(|| ConfigError::missing("global_settings"))?;
    let global = validate_global(global)?;

    let providers = raw
        .vpn_providers
        .ok_or_else(|| ConfigError::missing("vpn_providers"))?;

    let providers = providers
        .into_iter()
        .map(|(name, provider)| validate_provider(&name, provider))
        .collect::<Result<Vec<_>, _>>()?;

    let providers = NonEmpty::from_vec(providers).ok_or_else(|| {
        ConfigError::invalid("vpn_providers", "at least one provider is required")
    })?;

    Ok(Config { global, providers })
}

fn validate_global(raw: RawGlobal) -> Result<GlobalSettings, ConfigError> {
    let proxy_port = raw
        .proxy_port
        .ok_or_else(|| ConfigError::missing("global_settings.proxy_port"))?;
    let proxy_port = port("global_settings.proxy_port", proxy_port)?;

    let image = raw
        .image
        .ok_or_else(|| ConfigError::missing("global_settings.image"))?;
    let image =
        ImageRef::parse(&image).map_err(|e| ConfigError::invalid("global_settings.image", e))?;

    let project = raw.project.unwrap_or_else(|| DEFAULT_PROJECT.to_string());
    if !is_valid_project_name(&project) {
        return Err(ConfigError::invalid(
            "global_settings.project",
            "must be lowercase letters, digits, '-' or '_' and start with a letter or digit",
        ));
    }

    let proxy_image = match raw.proxy_image {
        Some(image) => ImageRef::parse(&image)
            .map_err(|e| ConfigError::invalid("global_settings.proxy_image", e))?,
        None => ImageRef::parse(DEFAULT_PROXY_IMAGE)
            .map_err(|e| ConfigError::invalid("global_settings.proxy_image", e))?,
    };

    let tunnel_port = match raw.tunnel_port {
        Some(value) => port("global_settings.tunnel_port", value)?,
        None => DEFAULT_TUNNEL_PORT,
    };

    let optional_env = env_defaults("global_settings.optional_env", raw.optional_env)?;

    if raw.logging.max_size.trim().is_empty() {
        return Err(ConfigError::invalid(
            "global_settings.logging.max_size",
            "cannot be empty",
        ));
    }
    if raw.logging.max_file == 0 {
        return Err(ConfigError::invalid(
            "global_settings.logging.max_file",
            "must be at least 1",
        ));
    }

    validate_proxy(&raw.proxy, proxy_port)?;

    Ok(GlobalSettings {
        proxy_port,
        image,
        project,
        runtime: raw.runtime,
        proxy_image,
        tunnel_port,
        optional_env,
        logging: raw.logging,
        proxy: raw.proxy,
    })
}

fn validate_proxy(proxy: &ProxyConfig, proxy_port: u16) -> Result<(), ConfigError> {
    if let Some(stats_port) = proxy.stats_port {
        if stats_port == 0 {
            return Err(ConfigError::invalid(
                "global_settings.proxy.stats_port",
                "must be between 1 and 65535",
            ));
        }
        if stats_port == proxy_port {
            return Err(ConfigError::invalid(
                "global_settings.proxy.stats_port",
                "must differ from proxy_port",
            ));
        }
    }

    let health = &proxy.health_check;
    if health.port == 0 {
        return Err(ConfigError::invalid(
            "global_settings.proxy.health_check.port",
            "must be between 1 and 65535",
        ));
    }
    if !health.path.starts_with('/') || health.path.contains(char::is_whitespace) {
        return Err(ConfigError::invalid(
            "global_settings.proxy.health_check.path",
            "must start with '/' and contain no whitespace",
        ));
    }
    if health.interval.is_zero() {
        return Err(ConfigError::invalid(
            "global_settings.proxy.health_check.interval",
            "must be greater than zero",
        ));
    }
    if health.rise == 0 || health.fall == 0 {
        return Err(ConfigError::invalid(
            "global_settings.proxy.health_check",
            "rise and fall must be at least 1",
        ));
    }
    if proxy.maxconn == 0 {
        return Err(ConfigError::invalid(
            "global_settings.proxy.maxconn",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_provider(name: &str, raw: Option<RawProvider>) -> Result<ProviderSpec, ConfigError> {
    let base = format!("vpn_providers.{name}");
    let provider_name = ProviderName::new(name).map_err(|e| ConfigError::invalid(&base, e))?;

    let raw = raw.ok_or_else(|| ConfigError::missing(format!("{base}.num_containers")))?;

    let count_path = format!("{base}.num_containers");
    let count = raw
        .num_containers
        .ok_or_else(|| ConfigError::missing(&count_path))?;
    let num_containers = u32::try_from(count)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            ConfigError::invalid(&count_path, format!("must be a positive integer, got {count}"))
        })?;

    let mut required_env = IndexMap::with_capacity(raw.required_env.len());
    for (key, placeholder) in raw.required_env {
        let path = format!("{base}.required_env.{key}");
        check_env_name(&path, &key)?;
        let placeholder = placeholder
            .as_deref()
            .map(Placeholder::new)
            .transpose()
            .map_err(|e| ConfigError::invalid(&path, e))?
            .ok_or_else(|| {
                ConfigError::invalid(&path, "placeholder must be a non-empty string")
            })?;
        required_env.insert(key, placeholder);
    }

    let optional_env = env_defaults(&format!("{base}.optional_env"), raw.optional_env)?;

    let server_regions = raw.server_regions.unwrap_or_default();
    for (index, region) in server_regions.iter().enumerate() {
        if region.trim().is_empty() || region.contains(',') {
            return Err(ConfigError::invalid(
                format!("{base}.server_regions[{index}]"),
                "region must be non-empty and cannot contain ','",
            ));
        }
    }

    Ok(ProviderSpec {
        name: provider_name,
        num_containers,
        required_env,
        optional_env,
        server_regions,
    })
}

fn env_defaults(
    base: &str,
    raw: IndexMap<String, serde_yaml::Value>,
) -> Result<IndexMap<String, String>, ConfigError> {
    raw.into_iter()
        .map(|(key, value)| {
            let path = format!("{base}.{key}");
            check_env_name(&path, &key)?;
            let value = scalar_to_string(&value).ok_or_else(|| {
                ConfigError::invalid(&path, "expected a string, number or boolean")
            })?;
            Ok((key, value))
        })
        .collect()
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn check_env_name(path: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.contains('=') || name.contains(char::is_whitespace) {
        return Err(ConfigError::invalid(
            path,
            "environment variable names cannot be empty or contain '=' or whitespace",
        ));
    }
    Ok(())
}

fn port(path: &str, value: i64) -> Result<u16, ConfigError> {
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| {
            ConfigError::invalid(path, format!("port must be between 1 and 65535, got {value}"))
        })
}

fn is_valid_project_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
