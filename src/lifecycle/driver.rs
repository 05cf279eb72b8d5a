// ABOUTME: Orchestrator driving the pool through up, down, list, run and interactive.
// ABOUTME: Tracks LifecycleState and moves to Failed on external failures during up.

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::render::{ArtifactPaths, compose::PROXY_SERVICE};
use crate::runtime::{Action, ContainerRuntime, ProxyRouter, RoutedOutput, ServiceStatus};
use crate::topology::Topology;

use super::error::ExecutionError;
use super::launch::Launch;
use super::state::LifecycleState;

/// Drives one pool through a container runtime and a proxy router.
pub struct Orchestrator<R, P> {
    runtime: R,
    router: P,
    paths: ArtifactPaths,
    project: String,
    state: LifecycleState,
    diagnostics: Diagnostics,
}

impl<R: ContainerRuntime, P: ProxyRouter> Orchestrator<R, P> {
    pub fn new(runtime: R, router: P, paths: ArtifactPaths, project: impl Into<String>) -> Self {
        Self {
            runtime,
            router,
            paths,
            project: project.into(),
            state: LifecycleState::Down,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Regenerate descriptors and (re)create every service.
    ///
    /// Render and write failures leave the state unchanged; runtime failures
    /// move the pool to [`LifecycleState::Failed`].
    pub async fn up(&mut self, topology: &Topology) -> Result<Vec<ServiceStatus>> {
        self.reject_if_failed(Action::Up)?;

        let previous = self.state;
        self.state = LifecycleState::Generating;
        let written = match Launch::new(topology, self.paths.clone())
            .render()
            .map_err(Error::from)
            .and_then(|launch| launch.write().map_err(Error::from))
        {
            Ok(written) => written,
            Err(e) => {
                self.state = previous;
                return Err(e);
            }
        };

        self.state = LifecycleState::Starting;
        let confirmed = async {
            let started = written.start(&self.runtime).await?;
            Ok::<_, Error>(started.confirm(&self.runtime).await?)
        }
        .await;

        match confirmed {
            Ok(launch) => {
                self.state = LifecycleState::Up;
                Ok(launch.into_services())
            }
            Err(e) => {
                tracing::error!(
                    project = %self.project,
                    error = %e,
                    "up failed; run `down` to recover"
                );
                self.state = LifecycleState::Failed;
                Err(e)
            }
        }
    }

    /// Stop and remove every service. Accepted in any state; descriptors are kept.
    pub async fn down(&mut self) -> Result<()> {
        self.state = LifecycleState::Stopping;

        match self.runtime.list().await {
            Ok(existing) if existing.is_empty() => {
                self.diagnostics.warn(Warning::nothing_to_stop(&self.project));
            }
            Ok(existing) => tracing::debug!(services = existing.len(), "stopping services"),
            Err(e) => self
                .diagnostics
                .warn(Warning::listing_unavailable(&self.project, &e)),
        }

        match self.runtime.remove().await {
            Ok(()) => {
                tracing::info!(project = %self.project, "pool stopped");
                self.state = LifecycleState::Down;
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                Err(e.into())
            }
        }
    }

    /// Services of the project. Read-only; allowed in any state.
    pub async fn list(&self) -> Result<Vec<ServiceStatus>> {
        Ok(self.runtime.list().await?)
    }

    /// Derive Up or Down from the runtime listing. A Failed pool stays Failed.
    pub async fn observe(&mut self) -> Result<LifecycleState> {
        if self.state == LifecycleState::Failed {
            return Ok(self.state);
        }

        let services = self.runtime.list().await?;
        let proxy_running = services
            .iter()
            .any(|s| s.service == PROXY_SERVICE && s.is_running());
        let tunnel_running = services
            .iter()
            .any(|s| s.service != PROXY_SERVICE && s.is_running());

        self.state = if proxy_running && tunnel_running {
            LifecycleState::Up
        } else {
            LifecycleState::Down
        };
        tracing::debug!(state = %self.state, services = services.len(), "observed pool");
        Ok(self.state)
    }

    /// Run `command` with its traffic routed through the pool.
    pub async fn run(&mut self, command: &[String]) -> Result<RoutedOutput> {
        if command.is_empty() {
            return Err(ExecutionError::EmptyCommand { action: Action::Run }.into());
        }
        self.require_up(Action::Run).await?;

        let output = self.router.route(command).await?;
        tracing::debug!(exit_code = output.exit_code, "routed command finished");
        Ok(output)
    }

    /// Attach an interactive shell routed through the pool; returns its exit code.
    pub async fn interactive(&mut self, shell: &str) -> Result<i32> {
        self.require_up(Action::Interactive).await?;
        Ok(self.router.open_session(shell).await?)
    }

    fn reject_if_failed(&self, action: Action) -> Result<()> {
        if self.state == LifecycleState::Failed {
            return Err(Error::InvalidTransition {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    async fn require_up(&mut self, action: Action) -> Result<()> {
        self.reject_if_failed(action)?;
        if self.observe().await? != LifecycleState::Up {
            return Err(ExecutionError::PoolNotUp {
                action,
                project: self.project.clone(),
            }
            .into());
        }
        Ok(())
    }
}
