// ABOUTME: Compose CLI adapters implementing ContainerRuntime and ProxyRouter.
// ABOUTME: Shells out to `docker compose` / `podman compose` scoped to one project.

use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Output, Stdio};
use tokio::io::AsyncWrite;
use tokio::process::Command;

use super::error::{DecodeSnafu, RuntimeError, SpawnSnafu};
use super::traits::{ContainerRuntime, ProxyRouter};
use super::types::{Action, RoutedOutput, RuntimeType, ServiceState, ServiceStatus};

/// Proxy variables exported into routed commands.
const PROXY_VARIABLES: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

/// A compose project on the local runtime.
#[derive(Debug, Clone)]
pub struct ComposeProject {
    runtime: RuntimeType,
    project: String,
    compose_file: PathBuf,
}

impl ComposeProject {
    pub fn new(runtime: RuntimeType, project: impl Into<String>, compose_file: PathBuf) -> Self {
        Self {
            runtime,
            project: project.into(),
            compose_file,
        }
    }

    pub fn runtime(&self) -> RuntimeType {
        self.runtime
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Leading arguments shared by every invocation.
    ///
    /// The file is omitted when it does not exist so project-scoped queries
    /// still work before the first `up`.
    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "compose".to_string(),
            "-p".to_string(),
            self.project.clone(),
        ];
        if self.compose_file.is_file() {
            args.push("-f".to_string());
            args.push(self.compose_file.display().to_string());
        }
        args
    }

    fn command<I, S>(&self, args: I) -> (Command, String)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut full = self.base_args();
        full.extend(args.into_iter().map(Into::into));

        let mut cmd = Command::new(self.runtime.program());
        cmd.args(&full);
        let shown = format!("{} {}", self.runtime.program(), full.join(" "));
        (cmd, shown)
    }

    /// Run a compose subcommand to completion, failing on non-zero exit.
    async fn run_checked(&self, action: Action, args: &[&str]) -> Result<Output, RuntimeError> {
        let (mut cmd, shown) = self.command(args.iter().copied());
        tracing::debug!(%action, command = %shown, "invoking container runtime");

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context(SpawnSnafu {
                action,
                program: self.runtime.program(),
            })?;

        if !output.status.success() {
            return Err(RuntimeError::NonZeroExit {
                action,
                command: shown,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

/// [`ContainerRuntime`] backed by the compose CLI.
#[derive(Debug, Clone)]
pub struct ComposeRuntime {
    project: ComposeProject,
}

impl ComposeRuntime {
    pub fn new(project: ComposeProject) -> Self {
        Self { project }
    }
}

#[async_trait]
impl ContainerRuntime for ComposeRuntime {
    async fn create(&self) -> Result<(), RuntimeError> {
        self.project
            .run_checked(
                Action::Up,
                &["up", "-d", "--remove-orphans", "--force-recreate"],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self) -> Result<(), RuntimeError> {
        self.project
            .run_checked(Action::Down, &["down", "--remove-orphans"])
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ServiceStatus>, RuntimeError> {
        let output = self
            .project
            .run_checked(Action::List, &["ps", "--all", "--format", "json"])
            .await?;
        parse_ps(&String::from_utf8_lossy(&output.stdout))
            .context(DecodeSnafu { action: Action::List })
    }
}

/// [`ProxyRouter`] that executes inside the proxy service with proxy variables set.
#[derive(Debug, Clone)]
pub struct ComposeRouter {
    project: ComposeProject,
    proxy_service: String,
    proxy_url: String,
}

impl ComposeRouter {
    pub fn new(project: ComposeProject, proxy_service: impl Into<String>, proxy_port: u16) -> Self {
        Self {
            project,
            proxy_service: proxy_service.into(),
            proxy_url: format!("http://127.0.0.1:{proxy_port}"),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    fn exec_args(&self, tty: bool) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        if !tty {
            args.push("-T".to_string());
        }
        for name in PROXY_VARIABLES {
            args.push("-e".to_string());
            args.push(format!("{name}={}", self.proxy_url));
        }
        args.push(self.proxy_service.clone());
        args
    }
}

#[async_trait]
impl ProxyRouter for ComposeRouter {
    async fn route(&self, command: &[String]) -> Result<RoutedOutput, RuntimeError> {
        let mut args = self.exec_args(false);
        args.extend(command.iter().cloned());
        let (mut cmd, shown) = self.project.command(args);
        tracing::debug!(command = %shown, "routing command through proxy");

        cmd.stdin(Stdio::null());
        forward_streams(cmd, &mut tokio::io::stdout(), &mut tokio::io::stderr())
            .await
            .context(SpawnSnafu {
                action: Action::Run,
                program: self.project.runtime().program(),
            })
    }

    async fn open_session(&self, shell: &str) -> Result<i32, RuntimeError> {
        let mut args = self.exec_args(true);
        args.push(shell.to_string());
        let (mut cmd, shown) = self.project.command(args);
        tracing::debug!(command = %shown, "opening interactive session");

        let status = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .context(SpawnSnafu {
                action: Action::Interactive,
                program: self.project.runtime().program(),
            })?;

        Ok(exit_code(status))
    }
}

/// Spawn `cmd` and copy its stdout and stderr into `out` and `err` as they arrive.
async fn forward_streams<O, E>(
    mut cmd: Command,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<RoutedOutput>
where
    O: AsyncWrite + Unpin + ?Sized,
    E: AsyncWrite + Unpin + ?Sized,
{
    let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;
    let mut child_out = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;
    let mut child_err = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("child stderr was not captured"))?;

    let (stdout_bytes, stderr_bytes) = tokio::try_join!(
        tokio::io::copy(&mut child_out, out),
        tokio::io::copy(&mut child_err, err),
    )?;
    let status = child.wait().await?;

    Ok(RoutedOutput {
        exit_code: exit_code(status),
        stdout_bytes,
        stderr_bytes,
    })
}

/// Shell-style exit code: the process code, or 128 + signal number.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// One entry of `compose ps --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsEntry {
    name: String,
    #[serde(default)]
    service: String,
    state: ServiceState,
    #[serde(default)]
    health: String,
}

impl From<PsEntry> for ServiceStatus {
    fn from(entry: PsEntry) -> Self {
        ServiceStatus {
            name: entry.name,
            service: entry.service,
            state: entry.state,
            health: Some(entry.health).filter(|h| !h.is_empty()),
        }
    }
}

/// Parse `ps` output: either a JSON array or one JSON object per line.
fn parse_ps(stdout: &str) -> Result<Vec<ServiceStatus>, serde_json::Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<PsEntry> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?
    };

    Ok(entries.into_iter().map(ServiceStatus::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ndjson_rows() {
        let stdout = r#"{"Name":"pia-0","Service":"pia-0","State":"running","Health":"healthy"}
{"Name":"tunnelfleet-haproxy","Service":"haproxy","State":"exited","Health":""}
"#;
        let rows = parse_ps(stdout).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_running());
        assert_eq!(rows[0].health.as_deref(), Some("healthy"));
        assert_eq!(rows[1].service, "haproxy");
        assert_eq!(rows[1].state, ServiceState::Exited);
        assert_eq!(rows[1].health, None);
    }

    #[test]
    fn parses_json_array() {
        let stdout = r#"[{"Name":"pia-0","Service":"pia-0","State":"running"}]"#;
        let rows = parse_ps(stdout).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "pia-0");
    }

    #[test]
    fn empty_output_means_no_services() {
        assert!(parse_ps("\n").unwrap().is_empty());
        assert!(parse_ps("[]").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(parse_ps("NAME  IMAGE  STATUS").is_err());
    }

    #[test]
    fn exec_args_export_proxy_variables() {
        let project = ComposeProject::new(
            RuntimeType::Docker,
            "fleet",
            PathBuf::from("/nonexistent/docker-compose.yml"),
        );
        let router = ComposeRouter::new(project, "haproxy", 8080);
        let args = router.exec_args(false);

        assert_eq!(args[0], "exec");
        assert_eq!(args[1], "-T");
        assert!(args.contains(&"HTTPS_PROXY=http://127.0.0.1:8080".to_string()));
        assert!(args.contains(&"all_proxy=http://127.0.0.1:8080".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("haproxy"));
        assert!(!router.exec_args(true).contains(&"-T".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn routed_streams_are_forwarded_with_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'line one\\nline two\\n'; printf oops >&2; exit 3"]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let routed = forward_streams(cmd, &mut out, &mut err).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "line one\nline two\n");
        assert_eq!(String::from_utf8(err).unwrap(), "oops");
        assert_eq!(routed.exit_code, 3);
        assert_eq!(routed.stdout_bytes, 18);
        assert_eq!(routed.stderr_bytes, 4);
        assert!(!routed.success());
    }

    #[test]
    fn missing_compose_file_is_omitted() {
        let project = ComposeProject::new(
            RuntimeType::Podman,
            "fleet",
            PathBuf::from("/nonexistent/docker-compose.yml"),
        );
        assert_eq!(project.base_args(), ["compose", "-p", "fleet"]);
    }
}
