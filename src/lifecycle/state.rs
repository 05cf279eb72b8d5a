// ABOUTME: Launch state marker types for the type state pattern, plus the runtime lifecycle state.
// ABOUTME: Markers carry the data produced by the step that reached them.

use std::fmt;

use crate::render::Artifacts;
use crate::runtime::ServiceStatus;

/// Initial state: topology built, nothing rendered.
/// Available actions: `render()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// Both descriptors rendered in memory.
/// Available actions: `write()`
#[derive(Debug, Clone)]
pub struct Rendered {
    pub(crate) artifacts: Artifacts,
}

impl Rendered {
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }
}

/// Descriptors written to disk.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Written;

/// Runtime asked to create or recreate every service.
/// Available actions: `confirm()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Started;

/// Proxy service observed running.
/// Available actions: `services()`, `into_services()`
#[derive(Debug, Clone)]
pub struct Confirmed {
    pub(crate) services: Vec<ServiceStatus>,
}

/// Pool state tracked by the orchestrator across actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Down,
    Generating,
    Starting,
    Up,
    Stopping,
    /// An external failure left the pool in an unknown state; only `down` is accepted.
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Down => "down",
            LifecycleState::Generating => "generating",
            LifecycleState::Starting => "starting",
            LifecycleState::Up => "up",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}
