// ABOUTME: Error types for commands routed through the pool.
// ABOUTME: Raised when the pool or its proxy is not in a state to carry traffic.

use crate::runtime::Action;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("{action}: pool `{project}` is not up; run `up` first")]
    PoolNotUp { action: Action, project: String },

    #[error("{action}: proxy service `{service}` is not running after start")]
    ProxyNotRunning { action: Action, service: String },

    #[error("{action}: no command given")]
    EmptyCommand { action: Action },
}
