// ABOUTME: HAProxy descriptor renderer: one listener and one health-checked backend pool.
// ABOUTME: Pool members are exactly the topology's tunnel containers.

use std::fmt::Write;
use std::time::Duration;

use super::GENERATED_HEADER;
use super::error::RenderError;
use crate::config::ProxyMode;
use crate::topology::Topology;

pub const FRONTEND: &str = "tunnel-in";
pub const BACKEND: &str = "tunnel-pool";

/// Render the proxy descriptor for `topology`.
pub fn render(topology: &Topology) -> Result<String, RenderError> {
    if topology.is_empty() {
        return Err(RenderError::EmptyPool);
    }

    let settings = topology.settings();
    let proxy = &settings.proxy;
    let health = &proxy.health_check;
    let log_option = match proxy.mode {
        ProxyMode::Http => "httplog",
        ProxyMode::Tcp => "tcplog",
    };

    let mut out = String::from(GENERATED_HEADER);

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "global
    log stdout format raw local0
    maxconn {maxconn}

defaults
    log global
    mode {mode}
    option {log_option}
    timeout connect {connect}
    timeout client {client}
    timeout server {server}

frontend {FRONTEND}
    bind *:{port}
    default_backend {BACKEND}

backend {BACKEND}
    balance {balance}
    option httpchk GET {path}
    http-check expect status 200
",
        maxconn = proxy.maxconn,
        mode = proxy.mode,
        connect = millis(proxy.timeouts.connect),
        client = millis(proxy.timeouts.client),
        server = millis(proxy.timeouts.server),
        port = settings.proxy_port,
        balance = proxy.balance,
        path = health.path,
    );

    for name in topology.container_names() {
        let _ = writeln!(
            out,
            "    server {name} {name}:{tunnel_port} check port {health_port} inter {interval} rise {rise} fall {fall} init-addr libc,none",
            tunnel_port = settings.tunnel_port,
            health_port = health.port,
            interval = millis(health.interval),
            rise = health.rise,
            fall = health.fall,
        );
    }

    if let Some(stats_port) = proxy.stats_port {
        let _ = write!(
            out,
            "
listen stats
    bind *:{stats_port}
    mode http
    stats enable
    stats uri /
    stats refresh 10s
"
        );
    }

    Ok(out)
}

/// HAProxy time value in milliseconds.
fn millis(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}
