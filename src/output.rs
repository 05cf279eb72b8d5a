// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::diagnostics::Diagnostics;
use crate::runtime::{RoutedOutput, ServiceStatus};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => match self.elapsed_secs() {
                Some(elapsed) => println!("{message} ({elapsed:.1}s)"),
                None => println!("{message}"),
            },
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                kind: None,
                message,
                duration_secs: self.elapsed_secs(),
            }),
        }
    }

    /// Print an error with its kind.
    pub fn error(&self, kind: &str, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error [{kind}]: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    kind: Some(kind),
                    message,
                    duration_secs: self.elapsed_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print collected warnings (tracing already logged them at `warn`).
    pub fn warnings(&self, diagnostics: &Diagnostics) {
        for warning in diagnostics.warnings() {
            match self.mode {
                OutputMode::Normal => println!("Warning: {}", warning.message),
                OutputMode::Quiet => {}
                OutputMode::Json => emit(&JsonEvent {
                    event: "warning",
                    kind: None,
                    message: &warning.message,
                    duration_secs: None,
                }),
            }
        }
    }

    /// Print the service listing.
    pub fn services(&self, services: &[ServiceStatus]) {
        match self.mode {
            OutputMode::Normal => print!("{}", format_table(services)),
            OutputMode::Quiet => {
                for service in services.iter().filter(|s| s.is_running()) {
                    println!("{}", service.name);
                }
            }
            OutputMode::Json => emit(&services),
        }
    }
}

impl Output {
    /// Report a routed command once its streams have been forwarded.
    ///
    /// Human modes add nothing so the command's own output stays byte-exact.
    pub fn routed(&self, output: &RoutedOutput) {
        if self.mode == OutputMode::Json {
            emit(&RoutedEvent {
                event: "routed",
                routed: output,
            });
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    }
}

/// Render services as an aligned table.
pub fn format_table(services: &[ServiceStatus]) -> String {
    if services.is_empty() {
        return "No services running.\n".to_string();
    }

    let rows: Vec<[&str; 4]> = services
        .iter()
        .map(|s| {
            [
                s.name.as_str(),
                s.service.as_str(),
                s.state.as_str(),
                s.health.as_deref().unwrap_or("-"),
            ]
        })
        .collect();

    let header = ["NAME", "SERVICE", "STATE", "HEALTH"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct RoutedEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    routed: &'a RoutedOutput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ServiceState;

    fn status(name: &str, service: &str, state: ServiceState) -> ServiceStatus {
        ServiceStatus {
            name: name.to_string(),
            service: service.to_string(),
            state,
            health: None,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let table = format_table(&[
            status("protonvpn-0", "protonvpn-0", ServiceState::Running),
            status("tunnelfleet-haproxy", "haproxy", ServiceState::Exited),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME                 SERVICE"));
        assert!(lines[1].starts_with("protonvpn-0          protonvpn-0  running"));
        assert!(lines[2].ends_with("exited   -"));
    }

    #[test]
    fn routed_event_is_flat() {
        let routed = RoutedOutput {
            exit_code: 6,
            stdout_bytes: 0,
            stderr_bytes: 33,
        };
        let json = serde_json::to_value(RoutedEvent {
            event: "routed",
            routed: &routed,
        })
        .unwrap();
        assert_eq!(json["event"], "routed");
        assert_eq!(json["exit_code"], 6);
        assert_eq!(json["stderr_bytes"], 33);
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(format_table(&[]), "No services running.\n");
    }
}
