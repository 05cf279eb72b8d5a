// ABOUTME: Container runtime access for the tunnel pool.
// ABOUTME: Capability traits, runtime detection and compose CLI adapters.

mod compose;
mod detection;
mod error;
mod traits;
mod types;

pub use compose::{ComposeProject, ComposeRouter, ComposeRuntime};
pub use detection::{detect_runtime, detect_with};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::{ContainerRuntime, ProxyRouter};
pub use types::{Action, RoutedOutput, RuntimeType, ServiceState, ServiceStatus};
