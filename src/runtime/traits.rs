// ABOUTME: Capability traits the lifecycle driver uses to reach the container runtime.
// ABOUTME: ContainerRuntime manages the project's services; ProxyRouter runs commands via the proxy.

use async_trait::async_trait;

use super::error::RuntimeError;
use super::types::{RoutedOutput, ServiceStatus};

/// Service management for one compose project.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create or recreate every service declared in the deployment descriptor.
    async fn create(&self) -> Result<(), RuntimeError>;

    /// Stop and remove every service of the project. Succeeds when nothing exists.
    async fn remove(&self) -> Result<(), RuntimeError>;

    /// Services of the project, running or not.
    async fn list(&self) -> Result<Vec<ServiceStatus>, RuntimeError>;
}

/// Command execution with all traffic routed through the pool's proxy.
#[async_trait]
pub trait ProxyRouter: Send + Sync {
    /// Run `command` to completion, streaming its stdout and stderr to the caller.
    ///
    /// A non-zero exit of `command` is reported in [`RoutedOutput::exit_code`],
    /// not as an error.
    async fn route(&self, command: &[String]) -> Result<RoutedOutput, RuntimeError>;

    /// Attach an interactive `shell` to the caller's terminal; returns its exit code.
    async fn open_session(&self, shell: &str) -> Result<i32, RuntimeError>;
}
