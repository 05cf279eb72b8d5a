// ABOUTME: Resolved topology: one service instance per tunnel replica plus global settings.
// ABOUTME: Single source of truth consumed by both artifact renderers.

mod builder;
mod error;
mod resolver;

pub use builder::{HEALTH_SERVER_ENV, PROXY_ENABLE_ENV, REGIONS_ENV, SERVICE_PROVIDER_ENV};
pub use error::ResolutionError;
pub use resolver::{CredentialResolver, EnvCredentials, MissingCredential};

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::config::{Config, GlobalSettings};
use crate::diagnostics::Diagnostics;
use crate::types::{ContainerName, ImageRef, ProviderName, Secret};

/// Identity of a replica: `(provider, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub provider: ProviderName,
    pub replica: u32,
}

/// A resolved environment value.
///
/// Has no unresolved variant: a [`crate::types::Placeholder`]
/// cannot be stored in an instance environment.
///
/// ```compile_fail
/// use tunnelfleet::topology::EnvValue;
/// use tunnelfleet::types::Placeholder;
///
/// let slot = Placeholder::new("USERNAME").unwrap();
/// let _value = EnvValue::Secret(slot);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    Secret(Secret),
}

impl EnvValue {
    /// The value as written into a deployment descriptor.
    pub fn rendered(&self) -> &str {
        match self {
            EnvValue::Literal(value) => value,
            EnvValue::Secret(secret) => secret.expose(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, EnvValue::Secret(_))
    }
}

/// Ordered environment of one instance.
pub type Environment = IndexMap<String, EnvValue>;

/// One tunnel container replica. Immutable once built.
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    id: InstanceId,
    container_name: ContainerName,
    image: ImageRef,
    environment: Environment,
}

impl ServiceInstance {
    pub fn new(id: InstanceId, image: ImageRef, environment: Environment) -> Self {
        let container_name = ContainerName::for_replica(&id.provider, id.replica);
        Self {
            id,
            container_name,
            image,
            environment,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn provider(&self) -> &ProviderName {
        &self.id.provider
    }

    pub fn replica(&self) -> u32 {
        self.id.replica
    }

    pub fn container_name(&self) -> &ContainerName {
        &self.container_name
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

/// Ordered service instances plus the settings they were built with.
#[derive(Debug, Clone)]
pub struct Topology {
    settings: GlobalSettings,
    instances: Vec<ServiceInstance>,
}

impl Topology {
    /// Expand `config` into instances, resolving every credential through `resolver`.
    ///
    /// Fails on the first missing credential; no partial topology is returned.
    pub fn build(
        config: &Config,
        resolver: &impl CredentialResolver,
        diag: &mut Diagnostics,
    ) -> Result<Self, ResolutionError> {
        builder::build(config, resolver, diag)
    }

    /// Assemble a topology from prebuilt instances, enforcing unique container names.
    ///
    /// An empty instance list is accepted here; renderers reject it.
    pub fn from_instances(
        settings: GlobalSettings,
        instances: Vec<ServiceInstance>,
    ) -> Result<Self, ResolutionError> {
        let mut seen = HashSet::with_capacity(instances.len());
        for instance in &instances {
            if !seen.insert(instance.container_name()) {
                return Err(ResolutionError::DuplicateContainer(
                    instance.container_name().clone(),
                ));
            }
        }

        Ok(Self {
            settings,
            instances,
        })
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Instances in provider declaration order, then replica index.
    pub fn instances(&self) -> &[ServiceInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn container_names(&self) -> impl Iterator<Item = &ContainerName> {
        self.instances.iter().map(ServiceInstance::container_name)
    }
}
