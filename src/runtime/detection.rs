// ABOUTME: Runtime detection for the local system.
// ABOUTME: Uses the configured runtime or looks for docker, then podman, on PATH.

use super::error::RuntimeError;
use super::types::RuntimeType;

/// Candidates tried in order when no runtime is configured.
const DETECTION_ORDER: [RuntimeType; 2] = [RuntimeType::Docker, RuntimeType::Podman];

/// Detect the container runtime to drive.
///
/// An explicit `configured` runtime takes precedence but must still be installed.
pub fn detect_runtime(configured: Option<RuntimeType>) -> Result<RuntimeType, RuntimeError> {
    detect_with(configured, |program| which::which(program).is_ok())
}

/// Detection with an injectable `PATH` probe.
pub fn detect_with(
    configured: Option<RuntimeType>,
    installed: impl Fn(&str) -> bool,
) -> Result<RuntimeType, RuntimeError> {
    let candidates: Vec<RuntimeType> = match configured {
        Some(runtime) => vec![runtime],
        None => DETECTION_ORDER.to_vec(),
    };

    for runtime in &candidates {
        if installed(runtime.program()) {
            tracing::debug!(%runtime, "container runtime selected");
            return Ok(*runtime);
        }
    }

    Err(RuntimeError::NoRuntimeFound {
        searched: candidates.iter().map(|r| r.program().to_string()).collect(),
    })
}
