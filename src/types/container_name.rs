// ABOUTME: Deterministic container names for tunnel replicas.
// ABOUTME: A name is `<provider>-<replica>` and doubles as the compose service key.

use super::provider_name::ProviderName;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerName(String);

impl ContainerName {
    /// Name of replica `index` of `provider`. Stable across builds.
    pub fn for_replica(provider: &ProviderName, index: u32) -> Self {
        Self(format!("{provider}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
