// ABOUTME: Test support utilities.
// ABOUTME: Provides fake runtime adapters, sample configuration and tracing setup.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use tunnelfleet::config::Config;
use tunnelfleet::diagnostics::Diagnostics;
use tunnelfleet::runtime::{
    Action, ContainerRuntime, ProxyRouter, RoutedOutput, RuntimeError, ServiceState,
    ServiceStatus,
};
use tunnelfleet::topology::Topology;
use tunnelfleet::types::{Placeholder, ProviderName};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("tunnelfleet=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Two providers with two replicas each.
pub const TWO_PROVIDERS: &str = r#"
global_settings:
  proxy_port: 8888
  image: qmcgaw/gluetun:v3.39
vpn_providers:
  protonvpn:
    num_containers: 2
    server_regions: [Netherlands]
    required_env:
      OPENVPN_USER: USERNAME
      OPENVPN_PASSWORD: PASSWORD
  pia:
    num_containers: 2
    required_env:
      OPENVPN_USER: USERNAME
      OPENVPN_PASSWORD: PASSWORD
"#;

/// Resolver that derives a value from provider and placeholder.
pub fn fixed_credentials(placeholder: &Placeholder, provider: &ProviderName) -> Option<String> {
    Some(format!("{provider}-{}", placeholder.as_str().to_lowercase()))
}

pub fn topology(yaml: &str) -> Topology {
    let config = Config::from_yaml(yaml).unwrap();
    Topology::build(&config, &fixed_credentials, &mut Diagnostics::default()).unwrap()
}

#[derive(Debug, Default)]
pub struct RuntimeState {
    pub services: Vec<ServiceStatus>,
    pub create_calls: usize,
    pub remove_calls: usize,
    /// Make the next `create` fail like a failed `compose up`.
    pub fail_create: bool,
    /// The proxy container exits right after start.
    pub proxy_exits: bool,
    /// Make `list` fail like unparseable `compose ps` output.
    pub fail_list: bool,
}

/// In-memory runtime that starts whatever the written compose file declares.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    compose_file: PathBuf,
    pub state: Arc<Mutex<RuntimeState>>,
}

impl FakeRuntime {
    pub fn new(compose_file: PathBuf) -> Self {
        Self {
            compose_file,
            state: Arc::default(),
        }
    }

    pub fn running_names(&self) -> Vec<String> {
        self.state
            .lock()
            .services
            .iter()
            .filter(|s| s.is_running())
            .map(|s| s.name.clone())
            .collect()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn create(&self) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.create_calls += 1;
        if state.fail_create {
            return Err(RuntimeError::NonZeroExit {
                action: Action::Up,
                command: "docker compose up".to_string(),
                status: Some(1),
                stderr: "pull access denied".to_string(),
            });
        }

        let text = std::fs::read_to_string(&self.compose_file).unwrap();
        let document: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let declared = document["services"].as_mapping().unwrap();
        let proxy_exits = state.proxy_exits;

        state.services = declared
            .iter()
            .map(|(key, service)| {
                let key = key.as_str().unwrap().to_string();
                let state = if key == "haproxy" && proxy_exits {
                    ServiceState::Exited
                } else {
                    ServiceState::Running
                };
                ServiceStatus {
                    name: service["container_name"].as_str().unwrap().to_string(),
                    service: key,
                    state,
                    health: None,
                }
            })
            .collect();
        Ok(())
    }

    async fn remove(&self) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.remove_calls += 1;
        state.services.clear();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ServiceStatus>, RuntimeError> {
        let state = self.state.lock();
        if state.fail_list {
            let source = serde_json::from_str::<serde_json::Value>("NAME IMAGE").unwrap_err();
            return Err(RuntimeError::Decode {
                action: Action::List,
                source,
            });
        }
        Ok(state.services.clone())
    }
}

/// Router that records commands and replays a canned result.
#[derive(Debug, Clone)]
pub struct FakeRouter {
    pub routed: Arc<Mutex<Vec<Vec<String>>>>,
    pub sessions: Arc<Mutex<Vec<String>>>,
    pub reply: RoutedOutput,
    pub session_exit: i32,
}

impl Default for FakeRouter {
    fn default() -> Self {
        Self {
            routed: Arc::default(),
            sessions: Arc::default(),
            reply: RoutedOutput {
                exit_code: 0,
                stdout_bytes: 12,
                stderr_bytes: 0,
            },
            session_exit: 0,
        }
    }
}

#[async_trait]
impl ProxyRouter for FakeRouter {
    async fn route(&self, command: &[String]) -> Result<RoutedOutput, RuntimeError> {
        self.routed.lock().push(command.to_vec());
        Ok(self.reply.clone())
    }

    async fn open_session(&self, shell: &str) -> Result<i32, RuntimeError> {
        self.sessions.lock().push(shell.to_string());
        Ok(self.session_exit)
    }
}
