// ABOUTME: Errors from rendering and writing generated descriptors.
// ABOUTME: An empty backend pool is never rendered.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("topology has no tunnel instances; an empty backend pool cannot be rendered")]
    EmptyPool,

    #[error("failed to serialize deployment descriptor: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    pub source: std::io::Error,
}
