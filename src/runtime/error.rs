// ABOUTME: Runtime invocation error types with SNAFU pattern.
// ABOUTME: Every variant names the lifecycle action that was being performed.

use snafu::Snafu;

use super::types::Action;

/// Failure of an external runtime invocation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("{action}: failed to launch `{program}`: {source}"))]
    Spawn {
        action: Action,
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{action}: `{command}` exited with {}{}", describe_status(status), stderr_suffix(stderr)))]
    NonZeroExit {
        action: Action,
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[snafu(display("{action}: could not decode runtime output: {source}"))]
    Decode {
        action: Action,
        source: serde_json::Error,
    },

    #[snafu(display("no container runtime found on PATH (looked for {})", searched.join(", ")))]
    NoRuntimeFound { searched: Vec<String> },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// The runtime binary could not be started.
    SpawnFailed,
    /// The runtime ran and reported failure.
    NonZeroExit,
    /// The runtime's output was not in the expected format.
    UndecodableOutput,
    /// Neither docker nor podman is installed.
    NoRuntimeFound,
}

impl RuntimeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::Spawn { .. } => RuntimeErrorKind::SpawnFailed,
            RuntimeError::NonZeroExit { .. } => RuntimeErrorKind::NonZeroExit,
            RuntimeError::Decode { .. } => RuntimeErrorKind::UndecodableOutput,
            RuntimeError::NoRuntimeFound { .. } => RuntimeErrorKind::NoRuntimeFound,
        }
    }

    /// The action during which the failure happened, if any.
    pub fn action(&self) -> Option<Action> {
        match self {
            RuntimeError::Spawn { action, .. }
            | RuntimeError::NonZeroExit { action, .. }
            | RuntimeError::Decode { action, .. } => Some(*action),
            RuntimeError::NoRuntimeFound { .. } => None,
        }
    }

    /// Exit status reported by the runtime, if it ran to completion.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            RuntimeError::NonZeroExit { status, .. } => *status,
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
