//! The seven reports.
//!
//! Row field names follow the persisted document's naming. Absent values render as the
//! configured not-available text ("N/A" by default).

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use exa_core::bbu::{format_expiration, BbuSlot, BbuStatus, DeviceBbuStatus};
use exa_core::QueryConfig;
use exa_inventory::{ClusterRecord, DeviceRecord};

use crate::request::ReportKind;

/// Count per distinct version, in first-seen order. Serializes as a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSummary {
    counts: Vec<(String, usize)>,
}

impl VersionSummary {
    /// Counts one occurrence of `version`.
    pub fn record(&mut self, version: &str) {
        match self.counts.iter_mut().find(|(seen, _)| seen == version) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((version.to_string(), 1)),
        }
    }

    /// Count for `version`, 0 if never seen.
    #[must_use]
    pub fn count(&self, version: &str) -> usize {
        self.counts
            .iter()
            .find(|(seen, _)| seen == version)
            .map_or(0, |(_, count)| *count)
    }

    /// Versions in first-seen order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.counts.iter().map(|(version, _)| version.as_str())
    }

    /// Number of distinct versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for VersionSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (version, count) in &self.counts {
            map.serialize_entry(version, count)?;
        }
        map.end()
    }
}

/// Report 1 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Number of devices
    #[serde(rename = "Device_count")]
    pub device_count: usize,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
}

/// Report 1: device count per cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    /// One row per cluster
    pub clusters: Vec<InventoryRow>,
    /// Devices across all rows
    pub total_devices: usize,
}

/// Report 2 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmwareRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Device name
    #[serde(rename = "Device_name")]
    pub device_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Controller firmware release
    #[serde(rename = "SFA_version")]
    pub sfa_version: String,
    /// Platform model
    #[serde(rename = "Type")]
    pub platform_type: String,
}

/// Report 2: firmware per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmwareReport {
    /// One row per device
    pub devices: Vec<FirmwareRow>,
    /// Devices per firmware release
    pub version_summary: VersionSummary,
}

/// Report 3 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterVersionRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Software version
    #[serde(rename = "EXA_version")]
    pub exa_version: String,
}

/// Report 3: software version per cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterVersionReport {
    /// One row per cluster
    pub clusters: Vec<ClusterVersionRow>,
    /// Clusters per version
    pub version_summary: VersionSummary,
}

/// Report 4 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BbuRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Device name
    #[serde(rename = "Device_name")]
    pub device_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Expiration of battery 1
    #[serde(rename = "BBU1_expiration")]
    pub bbu1_expiration: String,
    /// Days left for battery 1; negative once expired, 0 when unknown
    #[serde(rename = "BBU1_remaining_days")]
    pub bbu1_remaining_days: i64,
    /// Rendered remaining life of battery 1
    #[serde(rename = "BBU1_remaining")]
    pub bbu1_remaining: String,
    /// Expiration of battery 2
    #[serde(rename = "BBU2_expiration")]
    pub bbu2_expiration: String,
    /// Days left for battery 2; negative once expired, 0 when unknown
    #[serde(rename = "BBU2_remaining_days")]
    pub bbu2_remaining_days: i64,
    /// Rendered remaining life of battery 2
    #[serde(rename = "BBU2_remaining")]
    pub bbu2_remaining: String,
}

/// Report 4: battery lifecycle per device. Devices without any battery date are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BbuReport {
    /// One row per device with battery data
    pub devices: Vec<BbuRow>,
}

/// Report 5 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Data network port types
    #[serde(rename = "Network_port_type")]
    pub network_port_type: String,
    /// Formatted capacity
    #[serde(rename = "Capacity")]
    pub capacity: String,
}

/// Report 5: capacity per cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    /// One row per cluster
    pub clusters: Vec<CapacityRow>,
}

/// Report 6 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Device name
    #[serde(rename = "Device_name")]
    pub device_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Serial of controller 0
    #[serde(rename = "Controller_c0_serial_number")]
    pub controller_c0_serial: String,
    /// Serial of controller 1
    #[serde(rename = "Controller_c1_serial_number")]
    pub controller_c1_serial: String,
}

/// Report 6: controller serials per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialReport {
    /// One row per device
    pub devices: Vec<SerialRow>,
}

/// Report 7 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpRow {
    /// Cluster name
    #[serde(rename = "Cluster_name")]
    pub cluster_name: String,
    /// Device name
    #[serde(rename = "Device_name")]
    pub device_name: String,
    /// Cluster owner
    #[serde(rename = "Asset_owner")]
    pub asset_owner: String,
    /// Address of controller 0
    #[serde(rename = "Controller_c0_ip")]
    pub controller_c0_ip: String,
    /// Address of controller 1
    #[serde(rename = "Controller_c1_ip")]
    pub controller_c1_ip: String,
    /// Management-plane address of the cluster
    #[serde(rename = "EMF_ip")]
    pub emf_ip: String,
}

/// Report 7: addresses per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpReport {
    /// One row per device
    pub devices: Vec<IpRow>,
}

/// Any report result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Report 1
    Inventory(InventoryReport),
    /// Report 2
    Firmware(FirmwareReport),
    /// Report 3
    ClusterVersion(ClusterVersionReport),
    /// Report 4
    BbuLifecycle(BbuReport),
    /// Report 5
    Capacity(CapacityReport),
    /// Report 6
    Serial(SerialReport),
    /// Report 7
    Ip(IpReport),
}

impl Report {
    /// Computes `kind` over already filtered clusters.
    #[must_use]
    pub fn compute(
        kind: ReportKind,
        clusters: &[&ClusterRecord],
        today: NaiveDate,
        config: &QueryConfig,
    ) -> Self {
        let text = Text(config);
        match kind {
            ReportKind::Inventory => Self::Inventory(inventory(clusters, text)),
            ReportKind::Firmware => Self::Firmware(firmware(clusters, text)),
            ReportKind::ClusterVersion => Self::ClusterVersion(cluster_versions(clusters, text)),
            ReportKind::BbuLifecycle => Self::BbuLifecycle(bbu_lifecycle(clusters, today, text)),
            ReportKind::Capacity => Self::Capacity(capacity(clusters, text)),
            ReportKind::Serial => Self::Serial(serials(clusters, text)),
            ReportKind::Ip => Self::Ip(addresses(clusters, text)),
        }
    }

    /// Which report this is.
    #[must_use]
    pub const fn kind(&self) -> ReportKind {
        match self {
            Self::Inventory(_) => ReportKind::Inventory,
            Self::Firmware(_) => ReportKind::Firmware,
            Self::ClusterVersion(_) => ReportKind::ClusterVersion,
            Self::BbuLifecycle(_) => ReportKind::BbuLifecycle,
            Self::Capacity(_) => ReportKind::Capacity,
            Self::Serial(_) => ReportKind::Serial,
            Self::Ip(_) => ReportKind::Ip,
        }
    }
}

/// Renders optional values with the not-available fallback.
#[derive(Clone, Copy)]
struct Text<'a>(&'a QueryConfig);

impl Text<'_> {
    fn or_na(self, value: Option<&str>) -> String {
        value
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(self.0.not_available.as_str())
            .to_string()
    }

    fn name(self, name: &str) -> String {
        self.or_na(Some(name))
    }

    fn owner(self, cluster: &ClusterRecord) -> String {
        self.or_na(cluster.asset_owner.as_deref())
    }
}

fn devices<'a>(
    clusters: &'a [&'a ClusterRecord],
) -> impl Iterator<Item = (&'a ClusterRecord, &'a DeviceRecord)> + 'a {
    clusters
        .iter()
        .flat_map(|cluster| cluster.devices.iter().map(move |device| (*cluster, device)))
}

fn inventory(clusters: &[&ClusterRecord], text: Text<'_>) -> InventoryReport {
    let rows: Vec<InventoryRow> = clusters
        .iter()
        .map(|cluster| InventoryRow {
            cluster_name: text.name(&cluster.name),
            device_count: cluster.devices.len(),
            asset_owner: text.owner(cluster),
        })
        .collect();
    let total_devices = rows.iter().map(|row| row.device_count).sum();
    InventoryReport {
        clusters: rows,
        total_devices,
    }
}

fn firmware(clusters: &[&ClusterRecord], text: Text<'_>) -> FirmwareReport {
    let mut version_summary = VersionSummary::default();
    let devices = devices(clusters)
        .map(|(cluster, device)| {
            let sfa_version = text.or_na(device.sfa_version.as_deref());
            version_summary.record(&sfa_version);
            FirmwareRow {
                cluster_name: text.name(&cluster.name),
                device_name: text.name(&device.name),
                asset_owner: text.owner(cluster),
                sfa_version,
                platform_type: text.or_na(device.platform_type.as_deref()),
            }
        })
        .collect();
    FirmwareReport {
        devices,
        version_summary,
    }
}

fn cluster_versions(clusters: &[&ClusterRecord], text: Text<'_>) -> ClusterVersionReport {
    let mut version_summary = VersionSummary::default();
    let rows = clusters
        .iter()
        .map(|cluster| {
            let exa_version = text.or_na(cluster.exa_version.as_deref());
            version_summary.record(&exa_version);
            ClusterVersionRow {
                cluster_name: text.name(&cluster.name),
                asset_owner: text.owner(cluster),
                exa_version,
            }
        })
        .collect();
    ClusterVersionReport {
        clusters: rows,
        version_summary,
    }
}

fn bbu_lifecycle(clusters: &[&ClusterRecord], today: NaiveDate, text: Text<'_>) -> BbuReport {
    let rows = devices(clusters)
        .filter_map(|(cluster, device)| {
            let slot1 = BbuSlot::new(device.bbu1_expired.clone(), device.bbu1_mfg_date.clone());
            let slot2 = BbuSlot::new(device.bbu2_expired.clone(), device.bbu2_mfg_date.clone());
            let status = DeviceBbuStatus::evaluate(&slot1, &slot2, today)?;

            let (bbu1_expiration, bbu1_remaining_days, bbu1_remaining) = slot_columns(status.bbu1, text);
            let (bbu2_expiration, bbu2_remaining_days, bbu2_remaining) = slot_columns(status.bbu2, text);
            Some(BbuRow {
                cluster_name: text.name(&cluster.name),
                device_name: text.name(&device.name),
                asset_owner: text.owner(cluster),
                bbu1_expiration,
                bbu1_remaining_days,
                bbu1_remaining,
                bbu2_expiration,
                bbu2_remaining_days,
                bbu2_remaining,
            })
        })
        .collect();
    BbuReport { devices: rows }
}

fn slot_columns(status: Option<BbuStatus>, text: Text<'_>) -> (String, i64, String) {
    match status {
        Some(status) => (
            format_expiration(status.expiration),
            status.remaining_days,
            status.render_remaining(),
        ),
        None => (text.or_na(None), 0, text.or_na(None)),
    }
}

fn capacity(clusters: &[&ClusterRecord], text: Text<'_>) -> CapacityReport {
    let rows = clusters
        .iter()
        .map(|cluster| CapacityRow {
            cluster_name: text.name(&cluster.name),
            asset_owner: text.owner(cluster),
            network_port_type: text.or_na(cluster.network_port_type.as_deref()),
            capacity: text.or_na(cluster.capacity.as_deref()),
        })
        .collect();
    CapacityReport { clusters: rows }
}

fn serials(clusters: &[&ClusterRecord], text: Text<'_>) -> SerialReport {
    let rows = devices(clusters)
        .map(|(cluster, device)| SerialRow {
            cluster_name: text.name(&cluster.name),
            device_name: text.name(&device.name),
            asset_owner: text.owner(cluster),
            controller_c0_serial: text.or_na(device.controller_c0_serial.as_deref()),
            controller_c1_serial: text.or_na(device.controller_c1_serial.as_deref()),
        })
        .collect();
    SerialReport { devices: rows }
}

fn addresses(clusters: &[&ClusterRecord], text: Text<'_>) -> IpReport {
    let rows = devices(clusters)
        .map(|(cluster, device)| IpRow {
            cluster_name: text.name(&cluster.name),
            device_name: text.name(&device.name),
            asset_owner: text.owner(cluster),
            controller_c0_ip: text.or_na(device.controller_c0_ip.as_deref()),
            controller_c1_ip: text.or_na(device.controller_c1_ip.as_deref()),
            emf_ip: text.or_na(cluster.emf_ip.as_deref()),
        })
        .collect();
    IpReport { devices: rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn device(name: &str, version: Option<&str>) -> DeviceRecord {
        DeviceRecord {
            sfa_version: version.map(str::to_string),
            platform_type: Some("ES400NVX".to_string()),
            ..DeviceRecord::new(name, Some("10.0.0.1".to_string()), None)
        }
    }

    fn sample() -> Vec<ClusterRecord> {
        vec![
            ClusterRecord {
                name: "exa1".to_string(),
                exa_version: Some("6.3.2".to_string()),
                asset_owner: Some("IDEA".to_string()),
                emf_ip: Some("10.0.0.100".to_string()),
                capacity: Some("30.80 TiB".to_string()),
                devices: vec![device("sfa1", Some("11.8.3")), device("sfa2", None)],
                ..ClusterRecord::default()
            },
            ClusterRecord {
                name: "exa2".to_string(),
                exa_version: Some("6.3.2".to_string()),
                devices: vec![device("sfa3", Some("11.8.3"))],
                ..ClusterRecord::default()
            },
        ]
    }

    fn compute(kind: ReportKind, clusters: &[ClusterRecord]) -> Report {
        let refs: Vec<&ClusterRecord> = clusters.iter().collect();
        Report::compute(kind, &refs, today(), &QueryConfig::default())
    }

    #[test]
    fn test_inventory() {
        let Report::Inventory(report) = compute(ReportKind::Inventory, &sample()) else {
            panic!("wrong report");
        };
        assert_eq!(report.total_devices, 3);
        assert_eq!(report.clusters[0].device_count, 2);
        assert_eq!(report.clusters[1].asset_owner, "N/A");
    }

    #[test]
    fn test_firmware_summary_has_na_bucket() {
        let Report::Firmware(report) = compute(ReportKind::Firmware, &sample()) else {
            panic!("wrong report");
        };
        assert_eq!(report.devices.len(), 3);
        assert_eq!(report.devices[1].sfa_version, "N/A");
        assert_eq!(report.version_summary.count("11.8.3"), 2);
        assert_eq!(report.version_summary.count("N/A"), 1);
        assert_eq!(
            report.version_summary.versions().collect::<Vec<_>>(),
            vec!["11.8.3", "N/A"]
        );
    }

    #[test]
    fn test_version_summary_serializes_as_ordered_map() {
        let mut summary = VersionSummary::default();
        summary.record("6.3.2");
        summary.record("6.2.0");
        summary.record("6.3.2");
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"6.3.2":2,"6.2.0":1}"#
        );
    }

    #[test]
    fn test_cluster_versions() {
        let Report::ClusterVersion(report) = compute(ReportKind::ClusterVersion, &sample()) else {
            panic!("wrong report");
        };
        assert_eq!(report.clusters.len(), 2);
        assert_eq!(report.version_summary.count("6.3.2"), 2);
    }

    #[test]
    fn test_bbu_rows() {
        let mut clusters = sample();
        clusters[0].devices[0].bbu1_mfg_date = Some("01/01/2020".to_string());
        clusters[0].devices[0].bbu2_expired = Some("2026-01-11".to_string());

        let Report::BbuLifecycle(report) = compute(ReportKind::BbuLifecycle, &clusters) else {
            panic!("wrong report");
        };
        // Devices without any battery date are left out.
        assert_eq!(report.devices.len(), 1);

        let row = &report.devices[0];
        assert_eq!(row.device_name, "sfa1");
        assert_eq!(row.bbu1_expiration, "2024-12-30");
        assert_eq!(row.bbu1_remaining_days, -367);
        assert_eq!(row.bbu1_remaining, "Expired 367 days ago");
        assert_eq!(row.bbu2_expiration, "2026-01-11");
        assert_eq!(row.bbu2_remaining_days, 10);
        assert_eq!(row.bbu2_remaining, "10 days");
    }

    #[test]
    fn test_bbu_single_slot() {
        let mut clusters = sample();
        clusters[1].devices[0].bbu2_expired = Some("2030-01-01".to_string());

        let Report::BbuLifecycle(report) = compute(ReportKind::BbuLifecycle, &clusters) else {
            panic!("wrong report");
        };
        let row = &report.devices[0];
        assert_eq!(row.bbu1_expiration, "N/A");
        assert_eq!(row.bbu1_remaining_days, 0);
        assert_eq!(row.bbu1_remaining, "N/A");
    }

    #[test]
    fn test_capacity_serial_and_ip() {
        let clusters = sample();

        let Report::Capacity(report) = compute(ReportKind::Capacity, &clusters) else {
            panic!("wrong report");
        };
        assert_eq!(report.clusters[0].capacity, "30.80 TiB");
        assert_eq!(report.clusters[1].capacity, "N/A");
        assert_eq!(report.clusters[0].network_port_type, "N/A");

        let Report::Serial(report) = compute(ReportKind::Serial, &clusters) else {
            panic!("wrong report");
        };
        assert_eq!(report.devices.len(), 3);
        assert_eq!(report.devices[0].controller_c0_serial, "N/A");

        let Report::Ip(report) = compute(ReportKind::Ip, &clusters) else {
            panic!("wrong report");
        };
        assert_eq!(report.devices[0].controller_c0_ip, "10.0.0.1");
        assert_eq!(report.devices[0].controller_c1_ip, "N/A");
        assert_eq!(report.devices[0].emf_ip, "10.0.0.100");
        assert_eq!(report.devices[2].emf_ip, "N/A");
    }

    #[test]
    fn test_row_field_names() {
        let value = serde_json::to_value(compute(ReportKind::Ip, &sample())).unwrap();
        let row = &value["devices"][0];
        assert_eq!(row["Cluster_name"], "exa1");
        assert_eq!(row["EMF_ip"], "10.0.0.100");
    }

    #[test]
    fn test_custom_not_available() {
        let clusters = sample();
        let refs: Vec<&ClusterRecord> = clusters.iter().collect();
        let config = QueryConfig {
            not_available: "-".to_string(),
            ..QueryConfig::default()
        };
        let Report::Capacity(report) = Report::compute(ReportKind::Capacity, &refs, today(), &config)
        else {
            panic!("wrong report");
        };
        assert_eq!(report.clusters[1].capacity, "-");
    }
}
