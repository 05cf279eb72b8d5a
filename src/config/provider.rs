// ABOUTME: Per-provider settings: replica count, credentials and options.
// ABOUTME: Required env holds unresolved placeholders, never credential values.

use indexmap::IndexMap;
use std::num::NonZeroU32;
use std::ops::Range;

use crate::types::{Placeholder, ProviderName};

#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: ProviderName,
    pub num_containers: NonZeroU32,
    /// Environment variable name → credential placeholder.
    pub required_env: IndexMap<String, Placeholder>,
    /// Environment variable name → default value; overrides global defaults.
    pub optional_env: IndexMap<String, String>,
    pub server_regions: Vec<String>,
}

impl ProviderSpec {
    /// Replica indices in build order.
    pub fn replicas(&self) -> Range<u32> {
        0..self.num_containers.get()
    }
}
