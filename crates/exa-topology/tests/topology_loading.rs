//! Loading topology documents from disk.

mod common;

use common::{fixture, init_tracing};
use exa_core::{Error, ExtractConfig};
use exa_topology::load_topology;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_fixture() {
    init_tracing();
    let topology = load_topology(&fixture("exascaler.toml"), &ExtractConfig::default()).unwrap();

    assert_eq!(topology.version.as_deref(), Some("6.3.2"));
    assert_eq!(topology.emf_ip.as_deref(), Some("10.0.0.100"));

    let names: Vec<&str> = topology.devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["es400nvx-a", "es400nvx-b", "ai400x2-c"]);
    assert_eq!(topology.hosts.len(), 4);
}

#[test]
fn test_host_addressing() {
    init_tracing();
    let topology = load_topology(&fixture("exascaler.toml"), &ExtractConfig::default()).unwrap();

    let mds: Vec<_> = topology.hosts_for("es400nvx-a").collect();
    assert_eq!(mds.len(), 1);
    assert_eq!(mds[0].management_ip.as_deref(), Some("192.168.100.10"));
    assert_eq!(mds[0].lnet, vec!["172.16.0.10@o2ib0", "172.17.0.10@o2ib1"]);

    let oss: Vec<_> = topology.hosts_for("es400nvx-b").collect();
    assert_eq!(oss.len(), 2);
    // Plain `ib0` is not a Mellanox lnet interface.
    assert_eq!(oss[0].lnet, vec!["10.20.0.20@tcp0", "10.20.1.20@tcp1"]);
    // An interface without an address yields nothing.
    assert!(oss[1].lnet.is_empty());
    assert_eq!(oss[1].lnet_slot(1), None);
}

#[test]
fn test_unattached_host_and_device_without_hosts() {
    init_tracing();
    let topology = load_topology(&fixture("exascaler.toml"), &ExtractConfig::default()).unwrap();

    let client = topology
        .hosts
        .iter()
        .find(|h| h.hostname == "exa-client")
        .unwrap();
    assert_eq!(client.device, None);
    assert_eq!(topology.hosts_for("ai400x2-c").count(), 0);
}

#[test]
fn test_custom_management_interface() {
    init_tracing();
    let config = ExtractConfig::default().with_management_interface("mlxib0");
    let topology = load_topology(&fixture("exascaler.toml"), &config).unwrap();

    assert_eq!(topology.hosts[0].management_ip.as_deref(), Some("172.16.0.10"));
}

#[test]
fn test_missing_file() {
    init_tracing();
    let result = load_topology(&fixture("absent.toml"), &ExtractConfig::default());
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_not_toml_is_a_topology_error() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exascaler.toml");
    fs::write(&path, "[sfa.es400nvx-a\ncontrollers = ").unwrap();

    let result = load_topology(&path, &ExtractConfig::default());
    assert!(matches!(result, Err(Error::Topology(_))));
}

#[test]
fn test_malformed_sections_are_skipped() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exascaler.toml");
    fs::write(
        &path,
        r#"version = 6.3
sfa = { broken = "not a table", es400nvx-a = { controllers = ["10.0.0.1", "10.0.0.2"] } }
host = { bad = 7, oss0 = { sfa = "es400nvx-a" } }
"#,
    )
    .unwrap();

    let topology = load_topology(&path, &ExtractConfig::default()).unwrap();
    assert_eq!(topology.version.as_deref(), Some("6.3"));
    assert_eq!(topology.devices.len(), 2);
    assert_eq!(topology.devices[0].name, "broken");
    assert_eq!(topology.devices[0].controller_c0_ip, None);
    assert_eq!(
        topology.devices[1].controller_c1_ip.as_deref(),
        Some("10.0.0.2")
    );
    assert_eq!(topology.hosts.len(), 1);
    assert_eq!(topology.hosts[0].hostname, "oss0");
}
