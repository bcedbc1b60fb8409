//! Cluster model builder: joins bundle facts to topology devices by controller IP.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use exa_bundle::RawDeviceInfo;
use exa_core::{format_bytes, ExtractConfig};
use exa_topology::{Topology, TopologyDevice};

use crate::missing::{MissingFields, MissingLevel};
use crate::models::{ClusterRecord, DeviceRecord, HostAddresses, HostRecord};

const PORT_TYPE_PREFIX: &str = "IOC_PORT_TYPE_";

/// A freshly built cluster together with what could not be filled.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// The cluster record.
    pub cluster: ClusterRecord,
    /// Fields left null, by level.
    pub missing: MissingFields,
}

/// Bundles keyed by the controller IP they were collected from.
#[derive(Debug, Clone, Default)]
pub struct BundleIndex<'a> {
    by_ip: HashMap<&'a str, &'a RawDeviceInfo>,
}

impl<'a> BundleIndex<'a> {
    /// Indexes bundles by controller IP. Bundles without an IP are left out; on a
    /// duplicate IP the first bundle is kept.
    #[must_use]
    pub fn new(bundles: &'a [RawDeviceInfo]) -> Self {
        let mut by_ip = HashMap::with_capacity(bundles.len());
        for bundle in bundles {
            let Some(ip) = bundle.controller_ip.as_deref() else {
                continue;
            };
            if by_ip.contains_key(ip) {
                warn!(ip, "duplicate bundle for controller, keeping the first");
                continue;
            }
            by_ip.insert(ip, bundle);
        }
        Self { by_ip }
    }

    /// Bundle collected from either controller of `device`, c0 first.
    #[must_use]
    pub fn lookup(&self, device: &TopologyDevice) -> Option<&'a RawDeviceInfo> {
        device
            .controller_ips()
            .find_map(|ip| self.by_ip.get(ip).copied())
    }

    /// Number of indexed bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ip.len()
    }

    /// Returns true if no bundle carries an IP.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ip.is_empty()
    }
}

/// Builds the cluster record for one topology and its bundles.
///
/// Never fails: anything that cannot be joined or parsed stays null and is recorded in
/// [`BuildOutput::missing`].
#[must_use]
pub fn build_cluster(
    cluster_name: &str,
    topology: &Topology,
    bundles: &[RawDeviceInfo],
    owner: Option<&str>,
    config: &ExtractConfig,
) -> BuildOutput {
    let index = BundleIndex::new(bundles);
    info!(
        cluster = cluster_name,
        devices = topology.devices.len(),
        bundles = bundles.len(),
        indexed = index.len(),
        "building cluster"
    );

    let mut total_bytes: u64 = 0;
    let mut devices = Vec::with_capacity(topology.devices.len());
    for device in &topology.devices {
        let joined = index.lookup(device);
        if let Some(bundle) = joined {
            total_bytes = total_bytes.saturating_add(bundle.capacity_bytes);
        } else {
            debug!(device = %device.name, "no bundle for device");
        }
        devices.push(build_device(device, joined, topology));
    }

    let (network_description, network_port_type) = network_summary(bundles);
    let asset_owner = owner
        .filter(|owner| !owner.trim().is_empty())
        .unwrap_or(config.owner_placeholder.as_str())
        .to_string();

    let cluster = ClusterRecord {
        name: cluster_name.to_string(),
        exa_version: topology.version.clone(),
        capacity: format_bytes(nonzero(total_bytes)),
        network_description,
        network_port_type,
        emf_ip: topology.emf_ip.clone(),
        support_status: Some(config.support_status_placeholder.clone()),
        asset_owner: Some(asset_owner),
        devices,
    };

    let missing = collect_missing(&cluster);
    if !missing.is_empty() {
        info!(cluster = cluster_name, missing = missing.len(), "fields left for manual completion");
    }
    BuildOutput { cluster, missing }
}

fn build_device(
    device: &TopologyDevice,
    bundle: Option<&RawDeviceInfo>,
    topology: &Topology,
) -> DeviceRecord {
    let mut record = DeviceRecord::new(
        device.name.clone(),
        device.controller_c0_ip.clone(),
        device.controller_c1_ip.clone(),
    );

    if let Some(bundle) = bundle {
        if let Some(system_name) = bundle.system_name.as_deref() {
            if system_name != device.name {
                debug!(device = %device.name, system_name, "array reports a different name");
            }
        }
        record.platform_type = bundle.platform_type.clone();
        record.sfa_version = bundle.sfa_version.clone();
        record.capacity = format_bytes(bundle.capacity());
        record.controller_c0_serial = bundle.controller_c0_serial.clone();
        record.controller_c1_serial = bundle.controller_c1_serial.clone();
        record.bbu1_expired = bundle.bbu1_expired.clone();
        record.bbu2_expired = bundle.bbu2_expired.clone();
    }

    record.hosts = topology
        .hosts_for(&device.name)
        .map(|host| {
            HostRecord::new(
                host.hostname.clone(),
                HostAddresses {
                    management: host.management_ip.clone(),
                    lnet1: host.lnet_slot(1).map(str::to_string),
                    lnet2: host.lnet_slot(2).map(str::to_string),
                },
            )
        })
        .collect();
    record
}

/// Mellanox adapter descriptions and friendly port types across every bundle.
fn network_summary(bundles: &[RawDeviceInfo]) -> (Option<String>, Option<String>) {
    let mut descriptions = BTreeSet::new();
    let mut port_types = BTreeSet::new();

    for port in bundles
        .iter()
        .flat_map(|bundle| &bundle.client_io_ports)
        .filter(|port| port.is_mellanox())
    {
        if let Some(description) = port.description.as_deref() {
            descriptions.insert(description);
        }
        port_types.extend(port.port_types.iter().map(String::as_str));
    }

    let description = (!descriptions.is_empty())
        .then(|| descriptions.into_iter().collect::<Vec<_>>().join("; "));
    let port_type = (!port_types.is_empty()).then(|| {
        port_types
            .into_iter()
            .map(friendly_port_type)
            .collect::<Vec<_>>()
            .join(", ")
    });
    (description, port_type)
}

/// Maps a port type enum value to its display name.
#[must_use]
pub fn friendly_port_type(port_type: &str) -> String {
    match port_type {
        "IOC_PORT_TYPE_INFINIBAND" => "InfiniBand".to_string(),
        "IOC_PORT_TYPE_ETHERNET" => "Ethernet".to_string(),
        other => title_case(other.strip_prefix(PORT_TYPE_PREFIX).unwrap_or(other)),
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut previous_is_letter = false;
    text.chars()
        .map(|c| {
            let mapped = if previous_is_letter {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            };
            previous_is_letter = c.is_alphabetic();
            mapped
        })
        .collect()
}

const fn nonzero(bytes: u64) -> Option<u64> {
    if bytes == 0 {
        None
    } else {
        Some(bytes)
    }
}

fn collect_missing(cluster: &ClusterRecord) -> MissingFields {
    let mut missing = MissingFields::new();
    for key in cluster.null_fields() {
        missing.push(MissingLevel::Cluster, key);
    }
    for device in &cluster.devices {
        for key in device.null_fields() {
            missing.push_device_field(MissingLevel::Device, &device.name, key);
        }
        for key in device.unexpected_null_serials() {
            missing.push_device_field(MissingLevel::Controller, &device.name, key);
        }
    }
    missing
}
