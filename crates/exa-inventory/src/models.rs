//! Canonical document model.
//!
//! Field names and order follow the persisted YAML exactly; serialization keeps struct
//! field order. Deserialization is tolerant of hand-maintained documents: scalar fields
//! accept numbers and booleans as text, and a single device or host written as a bare
//! mapping is read as a one-element list.

use serde::{Deserialize, Deserializer, Serialize};

/// Role written for every host.
pub const HOST_ROLE: &str = "MDS/OSS";

/// Top-level persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Customer tag, preserved across regenerations.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar")]
    pub customer: Option<String>,
    /// Clusters described by the document.
    #[serde(default, deserialize_with = "one_or_many")]
    pub clusters: Vec<ClusterRecord>,
}

impl Document {
    /// Creates a document holding one cluster.
    #[must_use]
    pub fn new(customer: Option<String>, cluster: ClusterRecord) -> Self {
        Self {
            customer,
            clusters: vec![cluster],
        }
    }

    /// Finds a cluster by exact name.
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&ClusterRecord> {
        self.clusters.iter().find(|cluster| cluster.name == name)
    }
}

/// One cluster: topology-level facts plus its storage arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Cluster name.
    #[serde(rename = "Cluster_name", default, deserialize_with = "scalar_or_empty")]
    pub name: String,
    /// ExaScaler software version.
    #[serde(rename = "EXA version", default, deserialize_with = "scalar")]
    pub exa_version: Option<String>,
    /// Formatted total OST capacity.
    #[serde(rename = "Capacity", default, deserialize_with = "scalar")]
    pub capacity: Option<String>,
    /// Mellanox adapter descriptions.
    #[serde(rename = "Network_Description", default, deserialize_with = "scalar")]
    pub network_description: Option<String>,
    /// Friendly port type names.
    #[serde(rename = "Network_port_type", default, deserialize_with = "scalar")]
    pub network_port_type: Option<String>,
    /// Management-plane address.
    #[serde(rename = "EMF_IP", default, deserialize_with = "scalar")]
    pub emf_ip: Option<String>,
    /// Support contract status.
    #[serde(rename = "Support_status", default, deserialize_with = "scalar")]
    pub support_status: Option<String>,
    /// Customer owning the cluster.
    #[serde(rename = "Asset_owner", default, deserialize_with = "scalar")]
    pub asset_owner: Option<String>,
    /// Storage arrays in topology order.
    #[serde(default, deserialize_with = "one_or_many")]
    pub devices: Vec<DeviceRecord>,
}

impl ClusterRecord {
    /// Names of the cluster-level fields that are null, in document order.
    #[must_use]
    pub fn null_fields(&self) -> Vec<&'static str> {
        [
            ("EXA version", &self.exa_version),
            ("Capacity", &self.capacity),
            ("Network_Description", &self.network_description),
            ("Network_port_type", &self.network_port_type),
            ("EMF_IP", &self.emf_ip),
            ("Support_status", &self.support_status),
            ("Asset_owner", &self.asset_owner),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }
}

/// One storage array joined to its bundle facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Array name from the topology.
    #[serde(rename = "Device_name", default, deserialize_with = "scalar_or_empty")]
    pub name: String,
    /// Platform model.
    #[serde(rename = "type", default, deserialize_with = "scalar")]
    pub platform_type: Option<String>,
    /// Controller firmware release.
    #[serde(rename = "SFA version", default, deserialize_with = "scalar")]
    pub sfa_version: Option<String>,
    /// Formatted OST capacity.
    #[serde(rename = "Capacity", default, deserialize_with = "scalar")]
    pub capacity: Option<String>,
    /// Address of controller 0.
    #[serde(rename = "Controller_c0_ip", default, deserialize_with = "scalar")]
    pub controller_c0_ip: Option<String>,
    /// Address of controller 1.
    #[serde(rename = "Controller_c1_ip", default, deserialize_with = "scalar")]
    pub controller_c1_ip: Option<String>,
    /// Serial number of controller 0.
    #[serde(rename = "Controller_c0_serial_number", default, deserialize_with = "scalar")]
    pub controller_c0_serial: Option<String>,
    /// Serial number of controller 1.
    #[serde(rename = "Controller_c1_serial_number", default, deserialize_with = "scalar")]
    pub controller_c1_serial: Option<String>,
    /// Expiration date (`YYYY-MM-DD`) of battery 1.
    #[serde(rename = "BBU1_Expired_Date", default, deserialize_with = "scalar")]
    pub bbu1_expired: Option<String>,
    /// Expiration date (`YYYY-MM-DD`) of battery 2.
    #[serde(rename = "BBU2_Expired_Date", default, deserialize_with = "scalar")]
    pub bbu2_expired: Option<String>,
    /// Hand-entered manufacture date of battery 1.
    #[serde(
        rename = "BBU1_Mfg_Date",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar"
    )]
    pub bbu1_mfg_date: Option<String>,
    /// Hand-entered manufacture date of battery 2.
    #[serde(
        rename = "BBU2_Mfg_Date",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar"
    )]
    pub bbu2_mfg_date: Option<String>,
    /// Hosts attached to the array.
    #[serde(rename = "Hosts", default, deserialize_with = "one_or_many")]
    pub hosts: Vec<HostRecord>,
}

impl DeviceRecord {
    /// Creates a record carrying only the topology facts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        controller_c0_ip: Option<String>,
        controller_c1_ip: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            controller_c0_ip,
            controller_c1_ip,
            ..Self::default()
        }
    }

    /// Names of the device-level fields that are null, in document order.
    ///
    /// Controller addresses, hosts and the optional manufacture dates are not reported.
    #[must_use]
    pub fn null_fields(&self) -> Vec<&'static str> {
        [
            ("type", &self.platform_type),
            ("SFA version", &self.sfa_version),
            ("Capacity", &self.capacity),
            ("Controller_c0_serial_number", &self.controller_c0_serial),
            ("Controller_c1_serial_number", &self.controller_c1_serial),
            ("BBU1_Expired_Date", &self.bbu1_expired),
            ("BBU2_Expired_Date", &self.bbu2_expired),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }

    /// Serial fields expected but absent: a controller with an address should report a
    /// serial.
    #[must_use]
    pub fn unexpected_null_serials(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.controller_c0_ip.is_some() && self.controller_c0_serial.is_none() {
            keys.push("Controller_c0_serial_number");
        }
        if self.controller_c1_ip.is_some() && self.controller_c1_serial.is_none() {
            keys.push("Controller_c1_serial_number");
        }
        keys
    }
}

/// One server attached to a storage array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Host name.
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub hostname: String,
    /// Host role; always [`HOST_ROLE`] for generated documents.
    #[serde(default = "default_role", deserialize_with = "scalar_or_role")]
    pub role: String,
    /// Host addresses.
    #[serde(default)]
    pub ip: HostAddresses,
}

impl HostRecord {
    /// Creates a host with the fixed role.
    #[must_use]
    pub fn new(hostname: impl Into<String>, ip: HostAddresses) -> Self {
        Self {
            hostname: hostname.into(),
            role: default_role(),
            ip,
        }
    }
}

/// Management and lnet addresses of a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAddresses {
    /// Management interface address.
    #[serde(default, deserialize_with = "scalar")]
    pub management: Option<String>,
    /// First lnet address.
    #[serde(rename = "lnet1_network", default, deserialize_with = "scalar")]
    pub lnet1: Option<String>,
    /// Second lnet address.
    #[serde(rename = "lnet2_network", default, deserialize_with = "scalar")]
    pub lnet2: Option<String>,
}

fn default_role() -> String {
    HOST_ROLE.to_string()
}

/// Reads a scalar as text; null, blank strings and collections become `None`.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(text) if !text.trim().is_empty() => Some(text),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        serde_yaml::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

fn scalar_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar(deserializer)?.unwrap_or_default())
}

fn scalar_or_role<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar(deserializer)?.unwrap_or_else(default_role))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Reads a list, wrapping a lone mapping into a one-element list.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_null_fields() {
        let cluster = ClusterRecord {
            name: "exa1".to_string(),
            exa_version: Some("6.3.2".to_string()),
            support_status: Some("To be filled".to_string()),
            asset_owner: Some("IDEA".to_string()),
            ..ClusterRecord::default()
        };
        assert_eq!(
            cluster.null_fields(),
            vec!["Capacity", "Network_Description", "Network_port_type", "EMF_IP"]
        );
    }

    #[test]
    fn test_device_null_fields_skip_addresses() {
        let device = DeviceRecord::new("sfa1", None, None);
        assert_eq!(device.null_fields().len(), 7);
        assert!(!device.null_fields().contains(&"Controller_c0_ip"));
        assert!(device.unexpected_null_serials().is_empty());
    }

    #[test]
    fn test_unexpected_null_serials() {
        let mut device = DeviceRecord::new(
            "sfa1",
            Some("10.0.0.1".to_string()),
            Some("10.0.0.2".to_string()),
        );
        device.controller_c0_serial = Some("SN0".to_string());
        assert_eq!(
            device.unexpected_null_serials(),
            vec!["Controller_c1_serial_number"]
        );
    }

    #[test]
    fn test_lenient_scalars() {
        let cluster: ClusterRecord = serde_yaml::from_str(
            "Cluster_name: exa1\nEXA version: 6.3\nCapacity: ''\nEMF_IP: [1, 2]\n",
        )
        .unwrap();
        assert_eq!(cluster.exa_version.as_deref(), Some("6.3"));
        assert_eq!(cluster.capacity, None);
        assert_eq!(cluster.emf_ip, None);
        assert!(cluster.devices.is_empty());
    }

    #[test]
    fn test_single_device_mapping_is_wrapped() {
        let cluster: ClusterRecord = serde_yaml::from_str(
            "Cluster_name: exa1\ndevices:\n  Device_name: sfa1\n  Hosts:\n    hostname: oss1\n    ip:\n      management: 10.0.0.9\n",
        )
        .unwrap();
        assert_eq!(cluster.devices.len(), 1);
        assert_eq!(cluster.devices[0].name, "sfa1");
        assert_eq!(cluster.devices[0].hosts.len(), 1);
        assert_eq!(cluster.devices[0].hosts[0].role, HOST_ROLE);
        assert_eq!(
            cluster.devices[0].hosts[0].ip.management.as_deref(),
            Some("10.0.0.9")
        );
    }

    #[test]
    fn test_null_devices() {
        let cluster: ClusterRecord =
            serde_yaml::from_str("Cluster_name: exa1\ndevices: null\n").unwrap();
        assert!(cluster.devices.is_empty());
    }

    #[test]
    fn test_mfg_dates_skipped_when_absent() {
        let device = DeviceRecord::new("sfa1", None, None);
        let text = serde_yaml::to_string(&device).unwrap();
        assert!(!text.contains("Mfg_Date"));
        assert!(text.contains("BBU1_Expired_Date: null"));
    }

    #[test]
    fn test_document_customer_skipped_when_absent() {
        let document = Document::new(None, ClusterRecord::default());
        let text = serde_yaml::to_string(&document).unwrap();
        assert!(!text.contains("customer"));

        let document = Document::new(Some("Acme".to_string()), ClusterRecord::default());
        assert!(serde_yaml::to_string(&document).unwrap().starts_with("customer: Acme"));
    }
}
