// ABOUTME: Expands providers into replicas and composes each replica's environment.
// ABOUTME: Resolves credentials once per provider and fails fast on the first gap.

use indexmap::IndexMap;

use super::error::ResolutionError;
use super::resolver::CredentialResolver;
use super::{EnvValue, Environment, InstanceId, ServiceInstance, Topology};
use crate::config::{Config, GlobalSettings, ProviderSpec};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::Secret;

pub const PROXY_ENABLE_ENV: &str = "HTTPPROXY";
pub const SERVICE_PROVIDER_ENV: &str = "VPN_SERVICE_PROVIDER";
pub const HEALTH_SERVER_ENV: &str = "HEALTH_SERVER_ADDRESS";
pub const REGIONS_ENV: &str = "SERVER_REGIONS";

pub(super) fn build(
    config: &Config,
    resolver: &impl CredentialResolver,
    diag: &mut Diagnostics,
) -> Result<Topology, ResolutionError> {
    let settings = &config.global;
    let mut instances = Vec::new();

    for provider in config.providers.iter() {
        let credentials = resolve_credentials(provider, resolver)?;
        let environment = compose_environment(settings, provider, credentials, diag);

        for replica in provider.replicas() {
            let id = InstanceId {
                provider: provider.name.clone(),
                replica,
            };
            instances.push(ServiceInstance::new(
                id,
                settings.image.clone(),
                environment.clone(),
            ));
        }

        tracing::debug!(
            provider = %provider.name,
            replicas = provider.num_containers.get(),
            variables = environment.len(),
            "expanded provider"
        );
    }

    Topology::from_instances(settings.clone(), instances)
}

fn resolve_credentials(
    provider: &ProviderSpec,
    resolver: &impl CredentialResolver,
) -> Result<IndexMap<String, Secret>, ResolutionError> {
    provider
        .required_env
        .iter()
        .map(|(variable, placeholder)| {
            resolver
                .resolve(placeholder, &provider.name)
                .map(|secret| (variable.clone(), secret))
                .map_err(|missing| ResolutionError::MissingCredential {
                    provider: provider.name.clone(),
                    placeholder: placeholder.clone(),
                    variable: variable.clone(),
                    tried: missing.tried,
                })
        })
        .collect()
}

/// Layers, later overriding earlier: derived keys, global defaults,
/// provider defaults, resolved credentials. Keys keep their first position.
fn compose_environment(
    settings: &GlobalSettings,
    provider: &ProviderSpec,
    credentials: IndexMap<String, Secret>,
    diag: &mut Diagnostics,
) -> Environment {
    let mut env = Environment::new();

    env.insert(PROXY_ENABLE_ENV.to_string(), EnvValue::Literal("on".to_string()));
    env.insert(
        SERVICE_PROVIDER_ENV.to_string(),
        EnvValue::Literal(provider.name.service_provider_label()),
    );
    env.insert(
        HEALTH_SERVER_ENV.to_string(),
        EnvValue::Literal(format!(":{}", settings.proxy.health_check.port)),
    );
    if !provider.server_regions.is_empty() {
        env.insert(
            REGIONS_ENV.to_string(),
            EnvValue::Literal(provider.server_regions.join(",")),
        );
    }

    for (key, value) in settings.optional_env.iter().chain(&provider.optional_env) {
        env.insert(key.clone(), EnvValue::Literal(value.clone()));
    }

    for (key, secret) in credentials {
        if env.contains_key(&key) {
            diag.warn(Warning::shadowed_env(provider.name.as_str(), &key));
        }
        env.insert(key, EnvValue::Secret(secret));
    }

    env
}
