// ABOUTME: Tests for descriptor rendering and atomic writes.
// ABOUTME: Checks pool membership, determinism and that nothing is written on failure.

mod support;

use support::{TWO_PROVIDERS, topology};
use tunnelfleet::config::Config;
use tunnelfleet::diagnostics::Diagnostics;
use tunnelfleet::render::{
    ArtifactPaths, Artifacts, COMPOSE_FILE, PROXY_DESCRIPTOR_FILE, RenderError, compose, haproxy,
    write_atomic,
};
use tunnelfleet::topology::Topology;
use tunnelfleet::types::{Placeholder, ProviderName};

fn services(compose_yaml: &str) -> serde_yaml::Value {
    let document: serde_yaml::Value = serde_yaml::from_str(compose_yaml).unwrap();
    document["services"].clone()
}

fn strings(value: &serde_yaml::Value) -> Vec<String> {
    value
        .as_sequence()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

mod compose_descriptor {
    use super::*;

    #[test]
    fn one_service_per_instance_plus_proxy() {
        let yaml = compose::render(&topology(TWO_PROVIDERS)).unwrap();
        let services = services(&yaml);

        let keys: Vec<&str> = services
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, ["protonvpn-0", "protonvpn-1", "pia-0", "pia-1", "haproxy"]);

        let proxy = &services["haproxy"];
        assert_eq!(proxy["container_name"].as_str(), Some("tunnelfleet-haproxy"));
        assert_eq!(proxy["image"].as_str(), Some("haproxy:3.0"));
        assert_eq!(strings(&proxy["ports"]), ["8888:8888"]);
        assert_eq!(
            strings(&proxy["depends_on"]),
            ["protonvpn-0", "protonvpn-1", "pia-0", "pia-1"]
        );
        assert_eq!(
            strings(&proxy["volumes"]),
            ["./haproxy.cfg:/usr/local/etc/haproxy/haproxy.cfg:ro"]
        );
    }

    #[test]
    fn tunnel_service_shape() {
        let yaml = compose::render(&topology(TWO_PROVIDERS)).unwrap();
        let services = services(&yaml);
        let tunnel = &services["protonvpn-1"];

        assert_eq!(tunnel["image"].as_str(), Some("qmcgaw/gluetun:v3.39"));
        assert_eq!(strings(&tunnel["cap_add"]), ["NET_ADMIN"]);
        assert_eq!(strings(&tunnel["devices"]), ["/dev/net/tun:/dev/net/tun"]);
        assert_eq!(strings(&tunnel["volumes"]), ["gluetun:/gluetun"]);
        assert_eq!(tunnel["restart"].as_str(), Some("always"));
        assert_eq!(strings(&tunnel["networks"]), ["vpn-network"]);
        assert_eq!(tunnel["logging"]["driver"].as_str(), Some("json-file"));
        assert_eq!(tunnel["logging"]["options"]["max-size"].as_str(), Some("10m"));
        assert_eq!(tunnel["labels"][compose::LABEL_REPLICA].as_str(), Some("1"));

        let environment = strings(&tunnel["environment"]);
        assert_eq!(environment[0], "HTTPPROXY=on");
        assert!(environment.contains(&"VPN_SERVICE_PROVIDER=protonvpn".to_string()));
        assert!(environment.contains(&"SERVER_REGIONS=Netherlands".to_string()));
        assert!(environment.contains(&"OPENVPN_PASSWORD=protonvpn-password".to_string()));
    }

    #[test]
    fn dollar_signs_survive_compose_interpolation() {
        fn dollar_password(_: &Placeholder, _: &ProviderName) -> Option<String> {
            Some("pa$word".to_string())
        }
        let config = Config::from_yaml(TWO_PROVIDERS).unwrap();
        let topology =
            Topology::build(&config, &dollar_password, &mut Diagnostics::default()).unwrap();

        let yaml = compose::render(&topology).unwrap();
        let environment = strings(&services(&yaml)["pia-0"]["environment"]);

        assert!(environment.contains(&"OPENVPN_PASSWORD=pa$$word".to_string()));
        assert!(!environment.iter().any(|e| e.ends_with("=pa$word")));
    }

    #[test]
    fn user_proxy_flag_replaces_the_default() {
        let yaml = TWO_PROVIDERS.replace(
            "  pia:\n",
            "  pia:\n    optional_env:\n      HTTPPROXY: \"off\"\n",
        );
        let rendered = compose::render(&topology(&yaml)).unwrap();
        let environment = strings(&services(&rendered)["pia-0"]["environment"]);

        let flags: Vec<&str> = environment
            .iter()
            .map(String::as_str)
            .filter(|e| e.starts_with("HTTPPROXY="))
            .collect();
        assert_eq!(flags, ["HTTPPROXY=off"]);
    }

    #[test]
    fn declares_volume_and_network() {
        let yaml = compose::render(&topology(TWO_PROVIDERS)).unwrap();
        let document: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(document["name"].as_str(), Some("tunnelfleet"));
        assert!(document["volumes"]["gluetun"].is_mapping());
        assert_eq!(
            document["networks"]["vpn-network"]["driver"].as_str(),
            Some("bridge")
        );
    }

    #[test]
    fn stats_port_is_published() {
        let yaml = TWO_PROVIDERS.replace(
            "  proxy_port: 8888\n",
            "  proxy_port: 8888\n  proxy:\n    stats_port: 8404\n",
        );
        let rendered = compose::render(&topology(&yaml)).unwrap();
        let services = services(&rendered);
        assert_eq!(
            strings(&services["haproxy"]["ports"]),
            ["8888:8888", "8404:8404"]
        );
    }
}

mod proxy_descriptor {
    use super::*;

    #[test]
    fn four_members_and_one_listener() {
        let cfg = haproxy::render(&topology(TWO_PROVIDERS)).unwrap();

        let members: Vec<&str> = cfg
            .lines()
            .filter(|l| l.trim_start().starts_with("server "))
            .collect();
        assert_eq!(members.len(), 4);
        assert!(members[0].contains("server protonvpn-0 protonvpn-0:8888 check port 9999"));
        assert!(members[3].contains("pia-1:8888"));
        assert!(members.iter().all(|m| m.contains("inter 10000ms rise 2 fall 3")));

        assert_eq!(cfg.matches("\nfrontend ").count(), 1);
        assert_eq!(cfg.matches("\nbackend ").count(), 1);
        assert!(cfg.contains("bind *:8888"));
        assert!(cfg.contains("balance roundrobin"));
        assert!(cfg.contains("option httpchk GET /"));
        assert!(cfg.contains("timeout connect 5000ms"));
        assert!(!cfg.contains("listen stats"));
    }

    #[test]
    fn tuning_knobs_are_honoured() {
        let yaml = TWO_PROVIDERS.replace(
            "  proxy_port: 8888\n",
            r#"  proxy_port: 3128
  tunnel_port: 8118
  proxy:
    mode: tcp
    balance: static-rr
    stats_port: 8404
    timeouts:
      connect: 2s
    health_check:
      path: /v1/publicip/ip
      interval: 3s
"#,
        );
        let cfg = haproxy::render(&topology(&yaml)).unwrap();

        assert!(cfg.contains("mode tcp"));
        assert!(cfg.contains("option tcplog"));
        assert!(cfg.contains("balance static-rr"));
        assert!(cfg.contains("bind *:3128"));
        assert!(cfg.contains("protonvpn-0:8118"));
        assert!(cfg.contains("option httpchk GET /v1/publicip/ip"));
        assert!(cfg.contains("inter 3000ms"));
        assert!(cfg.contains("timeout connect 2000ms"));
        assert!(cfg.contains("listen stats\n    bind *:8404"));
    }
}

#[test]
fn regeneration_is_byte_identical() {
    let first = Artifacts::render(&topology(TWO_PROVIDERS)).unwrap();
    let second = Artifacts::render(&topology(TWO_PROVIDERS)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_topology_is_rejected_by_both_renderers() {
    let settings = topology(TWO_PROVIDERS).settings().clone();
    let empty = Topology::from_instances(settings, vec![]).unwrap();

    assert!(matches!(compose::render(&empty), Err(RenderError::EmptyPool)));
    assert!(matches!(haproxy::render(&empty), Err(RenderError::EmptyPool)));
    assert!(matches!(Artifacts::render(&empty), Err(RenderError::EmptyPool)));
}

mod writing {
    use super::*;

    #[test]
    fn artifacts_land_side_by_side() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        assert_eq!(paths.compose, dir.path().join(COMPOSE_FILE));
        assert_eq!(paths.proxy, dir.path().join(PROXY_DESCRIPTOR_FILE));

        let artifacts = Artifacts::render(&topology(TWO_PROVIDERS)).unwrap();
        artifacts.write(&paths).unwrap();

        assert_eq!(std::fs::read_to_string(&paths.compose).unwrap(), artifacts.compose);
        assert_eq!(std::fs::read_to_string(&paths.proxy).unwrap(), artifacts.proxy);
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haproxy.cfg");
        std::fs::write(&path, "stale").unwrap();

        write_atomic(&path, "fresh\n", 0o644).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[cfg(unix)]
    #[test]
    fn compose_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        Artifacts::render(&topology(TWO_PROVIDERS))
            .unwrap()
            .write(&paths)
            .unwrap();

        let mode = |p: &std::path::Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(paths.compose.as_path()), 0o600);
        assert_eq!(mode(paths.proxy.as_path()), 0o644);
    }

    #[test]
    fn failed_proxy_write_keeps_previous_compose_file() {
        let dir = tempfile::tempdir().unwrap();
        let compose = dir.path().join(COMPOSE_FILE);
        std::fs::write(&compose, "previous\n").unwrap();
        let paths = ArtifactPaths {
            compose: compose.clone(),
            proxy: dir.path().join("absent").join(PROXY_DESCRIPTOR_FILE),
        };

        let err = Artifacts::render(&topology(TWO_PROVIDERS))
            .unwrap()
            .write(&paths)
            .unwrap_err();

        assert_eq!(err.path, paths.proxy);
        assert_eq!(std::fs::read_to_string(&compose).unwrap(), "previous\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("haproxy.cfg");

        let err = write_atomic(&path, "x", 0o644).unwrap_err();

        assert_eq!(err.path, path);
    }
}
