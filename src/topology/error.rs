// ABOUTME: Errors raised while expanding configuration into a topology.
// ABOUTME: Missing credentials and container name collisions.

use crate::types::{ContainerName, Placeholder, ProviderName};

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error(
        "provider `{provider}`: missing credential `{placeholder}` for `{variable}` (looked up: {})",
        .tried.join(", ")
    )]
    MissingCredential {
        provider: ProviderName,
        placeholder: Placeholder,
        /// Environment variable the credential was destined for.
        variable: String,
        /// Sources consulted, in lookup order.
        tried: Vec<String>,
    },

    #[error("container name `{0}` is declared more than once")]
    DuplicateContainer(ContainerName),
}
