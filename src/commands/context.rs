// ABOUTME: Per-invocation context shared by the command handlers.
// ABOUTME: Loads configuration, resolves credentials and wires the compose adapters.

use std::env;
use std::path::{Path, PathBuf};

use tunnelfleet::config::Config;
use tunnelfleet::diagnostics::Diagnostics;
use tunnelfleet::error::Result;
use tunnelfleet::lifecycle::Orchestrator;
use tunnelfleet::render::{ArtifactPaths, compose::PROXY_SERVICE};
use tunnelfleet::runtime::{ComposeProject, ComposeRouter, ComposeRuntime, detect_runtime};
use tunnelfleet::topology::{EnvCredentials, Topology};

/// Credentials file looked up beside the configuration.
const DOTENV_FILE: &str = ".env";

pub type ComposeOrchestrator = Orchestrator<ComposeRuntime, ComposeRouter>;

pub struct Context {
    pub config: Config,
    /// Directory holding the configuration; descriptors are generated here.
    pub project_dir: PathBuf,
}

impl Context {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Config::locate(&env::current_dir()?)?,
        };
        let config = Config::load(&path)?;

        let project_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => env::current_dir()?,
        };

        Ok(Self {
            config,
            project_dir,
        })
    }

    pub fn topology(&self, diag: &mut Diagnostics) -> Result<Topology> {
        let credentials = EnvCredentials::with_dotenv(&self.project_dir.join(DOTENV_FILE))?;
        Ok(Topology::build(&self.config, &credentials, diag)?)
    }

    pub fn orchestrator(&self) -> Result<ComposeOrchestrator> {
        let global = &self.config.global;
        let runtime = detect_runtime(global.runtime)?;
        let paths = ArtifactPaths::in_dir(&self.project_dir);
        let project = ComposeProject::new(runtime, &global.project, paths.compose.clone());

        Ok(Orchestrator::new(
            ComposeRuntime::new(project.clone()),
            ComposeRouter::new(project, PROXY_SERVICE, global.proxy_port),
            paths,
            &global.project,
        ))
    }
}
