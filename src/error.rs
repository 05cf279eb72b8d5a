// ABOUTME: Application-wide error type for tunnelfleet.
// ABOUTME: Wraps each module's error and exposes a stable kind for the CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::{ConfirmError, ExecutionError, LifecycleState};
use crate::render::{RenderError, WriteError};
use crate::runtime::{Action, RuntimeError};
use crate::topology::ResolutionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("{action}: not accepted while the pool is {state}; run `down` first")]
    InvalidTransition {
        action: Action,
        state: LifecycleState,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Resolution(_) => "credentials",
            Error::Render(_) => "render",
            Error::Write(_) => "write",
            Error::Runtime(_) => "runtime",
            Error::Execution(_) => "execution",
            Error::InvalidTransition { .. } => "invalid-transition",
            Error::Io(_) => "io",
        }
    }
}

impl From<ConfirmError> for Error {
    fn from(err: ConfirmError) -> Self {
        match err {
            ConfirmError::Runtime(e) => Error::Runtime(e),
            ConfirmError::Execution(e) => Error::Execution(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
