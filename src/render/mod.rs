// ABOUTME: Artifact generation: compose and proxy descriptors rendered from one topology.
// ABOUTME: Both are rendered in memory before either is atomically written.

pub mod compose;
mod error;
pub mod haproxy;

pub use error::{RenderError, WriteError};

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::topology::Topology;

pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const PROXY_DESCRIPTOR_FILE: &str = "haproxy.cfg";

pub(crate) const GENERATED_HEADER: &str =
    "# Generated by tunnelfleet. Overwritten on every `up`; do not edit.\n";

/// Locations of the generated descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub compose: PathBuf,
    pub proxy: PathBuf,
}

impl ArtifactPaths {
    /// Descriptors live side by side so the compose file can mount `./haproxy.cfg`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            compose: dir.join(COMPOSE_FILE),
            proxy: dir.join(PROXY_DESCRIPTOR_FILE),
        }
    }
}

/// Rendered descriptor contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub compose: String,
    pub proxy: String,
}

impl Artifacts {
    pub fn render(topology: &Topology) -> Result<Self, RenderError> {
        let artifacts = Self {
            compose: compose::render(topology)?,
            proxy: haproxy::render(topology)?,
        };
        tracing::debug!(
            instances = topology.len(),
            compose_bytes = artifacts.compose.len(),
            proxy_bytes = artifacts.proxy.len(),
            "rendered descriptors"
        );
        Ok(artifacts)
    }

    /// Replace both descriptors on disk.
    ///
    /// Both are staged before either is renamed into place, so a failure while
    /// writing leaves the previous pair untouched. The compose file carries
    /// resolved credentials and is owner-only; the proxy descriptor must stay
    /// readable by the unprivileged proxy user in its container.
    pub fn write(&self, paths: &ArtifactPaths) -> Result<(), WriteError> {
        let compose = stage(&paths.compose, &self.compose, 0o600)?;
        let proxy = stage(&paths.proxy, &self.proxy, 0o644)?;
        persist(compose, &paths.compose)?;
        persist(proxy, &paths.proxy)?;
        tracing::info!(
            compose = %paths.compose.display(),
            proxy = %paths.proxy.display(),
            "wrote descriptors"
        );
        Ok(())
    }
}

/// Write `contents` to a temporary file beside `path` and rename it over `path`,
/// so readers only ever observe a complete file.
pub fn write_atomic(path: &Path, contents: &str, mode: u32) -> Result<(), WriteError> {
    let staged = stage(path, contents, mode)?;
    persist(staged, path)
}

/// Write `contents` to a synced temporary file in `path`'s directory.
fn stage(path: &Path, contents: &str, mode: u32) -> Result<NamedTempFile, WriteError> {
    let fail = write_error(path);
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(&fail)?;
    file.write_all(contents.as_bytes()).map_err(&fail)?;
    file.as_file().sync_all().map_err(&fail)?;
    set_mode(&file, mode).map_err(&fail)?;
    Ok(file)
}

fn persist(staged: NamedTempFile, path: &Path) -> Result<(), WriteError> {
    staged.persist(path).map_err(|e| write_error(path)(e.error))?;
    Ok(())
}

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> WriteError + '_ {
    move |source| WriteError {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn set_mode(file: &NamedTempFile, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &NamedTempFile, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
