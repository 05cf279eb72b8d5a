// ABOUTME: Compose deployment descriptor renderer.
// ABOUTME: One service per tunnel instance plus the proxy service, in topology order.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::RenderError;
use super::{GENERATED_HEADER, PROXY_DESCRIPTOR_FILE};
use crate::topology::{ServiceInstance, Topology};

pub const PROXY_SERVICE: &str = "haproxy";
pub const NETWORK: &str = "vpn-network";
pub const STATE_VOLUME: &str = "gluetun";
pub const PROXY_CONFIG_TARGET: &str = "/usr/local/etc/haproxy/haproxy.cfg";

const STATE_VOLUME_TARGET: &str = "/gluetun";
const TUN_DEVICE: &str = "/dev/net/tun";
const NET_ADMIN: &str = "NET_ADMIN";

pub const LABEL_ROLE: &str = "tunnelfleet.role";
pub const LABEL_PROVIDER: &str = "tunnelfleet.provider";
pub const LABEL_REPLICA: &str = "tunnelfleet.replica";

#[derive(Debug, Serialize)]
struct ComposeFile {
    name: String,
    services: IndexMap<String, ComposeService>,
    volumes: IndexMap<String, ComposeVolume>,
    networks: IndexMap<String, ComposeNetwork>,
}

#[derive(Debug, Serialize)]
struct ComposeService {
    container_name: String,
    image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cap_add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    devices: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    environment: Vec<String>,
    volumes: Vec<String>,
    logging: ComposeLogging,
    restart: &'static str,
    networks: Vec<String>,
    labels: IndexMap<&'static str, String>,
}

#[derive(Debug, Clone, Serialize)]
struct ComposeLogging {
    driver: &'static str,
    options: IndexMap<&'static str, String>,
}

#[derive(Debug, Default, Serialize)]
struct ComposeVolume {}

#[derive(Debug, Serialize)]
struct ComposeNetwork {
    driver: &'static str,
}

/// Render the compose descriptor for `topology`.
pub fn render(topology: &Topology) -> Result<String, RenderError> {
    if topology.is_empty() {
        return Err(RenderError::EmptyPool);
    }

    let settings = topology.settings();
    let logging = ComposeLogging {
        driver: "json-file",
        options: IndexMap::from([
            ("max-size", settings.logging.max_size.clone()),
            ("max-file", settings.logging.max_file.to_string()),
        ]),
    };

    let mut services: IndexMap<String, ComposeService> = topology
        .instances()
        .iter()
        .map(|instance| {
            (
                instance.container_name().to_string(),
                tunnel_service(instance, logging.clone()),
            )
        })
        .collect();

    let mut ports = vec![format!("{0}:{0}", settings.proxy_port)];
    if let Some(stats_port) = settings.proxy.stats_port {
        ports.push(format!("{0}:{0}", stats_port));
    }

    services.insert(
        PROXY_SERVICE.to_string(),
        ComposeService {
            container_name: format!("{}-{}", settings.project, PROXY_SERVICE),
            image: settings.proxy_image.to_string(),
            cap_add: vec![],
            devices: vec![],
            ports,
            depends_on: topology.container_names().map(ToString::to_string).collect(),
            environment: vec![],
            volumes: vec![format!(
                "./{PROXY_DESCRIPTOR_FILE}:{PROXY_CONFIG_TARGET}:ro"
            )],
            logging,
            restart: "always",
            networks: vec![NETWORK.to_string()],
            labels: IndexMap::from([(LABEL_ROLE, "proxy".to_string())]),
        },
    );

    let compose = ComposeFile {
        name: settings.project.clone(),
        services,
        volumes: IndexMap::from([(STATE_VOLUME.to_string(), ComposeVolume::default())]),
        networks: IndexMap::from([(NETWORK.to_string(), ComposeNetwork { driver: "bridge" })]),
    };

    let body = serde_yaml::to_string(&compose)?;
    Ok(format!("{GENERATED_HEADER}{body}"))
}

fn tunnel_service(instance: &ServiceInstance, logging: ComposeLogging) -> ComposeService {
    let environment = instance
        .environment()
        .iter()
        .map(|(key, value)| format!("{key}={}", escape_interpolation(value.rendered())))
        .collect();

    ComposeService {
        container_name: instance.container_name().to_string(),
        image: instance.image().to_string(),
        cap_add: vec![NET_ADMIN.to_string()],
        devices: vec![format!("{TUN_DEVICE}:{TUN_DEVICE}")],
        ports: vec![],
        depends_on: vec![],
        environment,
        volumes: vec![format!("{STATE_VOLUME}:{STATE_VOLUME_TARGET}")],
        logging,
        restart: "always",
        networks: vec![NETWORK.to_string()],
        labels: IndexMap::from([
            (LABEL_ROLE, "tunnel".to_string()),
            (LABEL_PROVIDER, instance.provider().to_string()),
            (LABEL_REPLICA, instance.replica().to_string()),
        ]),
    }
}

/// Compose interpolates `$NAME` and `${NAME}` in the file; `$$` is a literal `$`.
fn escape_interpolation(value: &str) -> String {
    value.replace('$', "$$")
}
