// ABOUTME: Runtime type definitions for Docker and Podman.
// ABOUTME: Includes the RuntimeType enum, driver actions and service status rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The container runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl RuntimeType {
    /// Executable name looked up on `PATH`.
    pub fn program(&self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Lifecycle action that triggered an external invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    List,
    Run,
    Interactive,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::List => "list",
            Action::Run => "run",
            Action::Interactive => "interactive",
        };
        f.write_str(name)
    }
}

/// Container state as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Created,
    Running,
    Restarting,
    Paused,
    Exited,
    Removing,
    Dead,
    #[serde(other)]
    Unknown,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Created => "created",
            ServiceState::Running => "running",
            ServiceState::Restarting => "restarting",
            ServiceState::Paused => "paused",
            ServiceState::Exited => "exited",
            ServiceState::Removing => "removing",
            ServiceState::Dead => "dead",
            ServiceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the project's service listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Container name.
    pub name: String,
    /// Compose service key.
    pub service: String,
    pub state: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        self.state == ServiceState::Running
    }
}

/// Outcome of a command routed through the proxy.
///
/// The command's streams are forwarded to the caller while it runs; only
/// their sizes are kept here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoutedOutput {
    pub exit_code: i32,
    pub stdout_bytes: u64,
    pub stderr_bytes: u64,
}

impl RoutedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
