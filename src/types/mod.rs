// ABOUTME: Validated domain types shared across config, topology and rendering.
// ABOUTME: Names, image references and credential slots.

mod container_name;
mod credential;
mod image_ref;
mod provider_name;

pub use container_name::ContainerName;
pub use credential::{EmptyPlaceholder, Placeholder, Secret};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use provider_name::{MAX_PROVIDER_NAME_LEN, ProviderName, ProviderNameError};
