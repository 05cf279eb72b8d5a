// ABOUTME: The `up` pipeline as a type-state value: render, write, start, confirm.
// ABOUTME: Each step consumes the previous state so steps cannot be skipped or reordered.

use crate::render::{ArtifactPaths, Artifacts, RenderError, WriteError, compose::PROXY_SERVICE};
use crate::runtime::{Action, ContainerRuntime, RuntimeError, ServiceStatus};
use crate::topology::Topology;

use super::error::ExecutionError;
use super::state::{Confirmed, Pending, Rendered, Started, Written};

/// An `up` in progress, parameterized by how far it got.
#[derive(Debug)]
pub struct Launch<'a, S> {
    topology: &'a Topology,
    paths: ArtifactPaths,
    state: S,
}

impl<'a> Launch<'a, Pending> {
    pub fn new(topology: &'a Topology, paths: ArtifactPaths) -> Self {
        Launch {
            topology,
            paths,
            state: Pending,
        }
    }

    /// Render both descriptors. Nothing touches the disk yet.
    pub fn render(self) -> Result<Launch<'a, Rendered>, RenderError> {
        let artifacts = Artifacts::render(self.topology)?;
        Ok(Launch {
            topology: self.topology,
            paths: self.paths,
            state: Rendered { artifacts },
        })
    }
}

impl<'a, S> Launch<'a, S> {
    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    fn advance<T>(self, state: T) -> Launch<'a, T> {
        Launch {
            topology: self.topology,
            paths: self.paths,
            state,
        }
    }
}

impl<'a> Launch<'a, Rendered> {
    /// Replace the descriptors on disk.
    pub fn write(self) -> Result<Launch<'a, Written>, WriteError> {
        self.state.artifacts.write(&self.paths)?;
        Ok(self.advance(Written))
    }
}

impl<'a> Launch<'a, Written> {
    /// Create or recreate every service.
    pub async fn start<R: ContainerRuntime + ?Sized>(
        self,
        runtime: &R,
    ) -> Result<Launch<'a, Started>, RuntimeError> {
        tracing::info!(
            project = %self.topology.settings().project,
            tunnels = self.topology.len(),
            "starting services"
        );
        runtime.create().await?;
        Ok(self.advance(Started))
    }
}

impl<'a> Launch<'a, Started> {
    /// Check that the proxy service is running.
    pub async fn confirm<R: ContainerRuntime + ?Sized>(
        self,
        runtime: &R,
    ) -> Result<Launch<'a, Confirmed>, ConfirmError> {
        let services = runtime.list().await?;
        let proxy_running = services
            .iter()
            .any(|s| s.service == PROXY_SERVICE && s.is_running());
        if !proxy_running {
            return Err(ExecutionError::ProxyNotRunning {
                action: Action::Up,
                service: PROXY_SERVICE.to_string(),
            }
            .into());
        }

        let running = services.iter().filter(|s| s.is_running()).count();
        tracing::info!(running, total = services.len(), "pool confirmed");
        Ok(self.advance(Confirmed { services }))
    }
}

impl Launch<'_, Confirmed> {
    pub fn services(&self) -> &[ServiceStatus] {
        &self.state.services
    }

    pub fn into_services(self) -> Vec<ServiceStatus> {
        self.state.services
    }
}

/// Failure of the confirmation step.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
