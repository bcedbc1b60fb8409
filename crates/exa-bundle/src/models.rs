//! Typed views of the JSON members inside an SFA bundle, and the facts extracted from them.

use serde::{Deserialize, Deserializer, Serialize};

/// JSON members of a bundle that the parser consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleMember {
    /// Platform and controller serial numbers
    PlatformInfo,
    /// Storage system name
    StorageSystem,
    /// Controller firmware release
    Controller,
    /// Battery backup (UPS) units
    PowerBackup,
    /// Virtual disk inventory
    VirtualDisk,
    /// Client-facing I/O controllers (host adapters)
    ClientIoController,
}

impl BundleMember {
    /// Every member, in extraction order.
    pub const ALL: [Self; 6] = [
        Self::PlatformInfo,
        Self::StorageSystem,
        Self::Controller,
        Self::PowerBackup,
        Self::VirtualDisk,
        Self::ClientIoController,
    ];

    /// File name of the member inside the bundle root directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PlatformInfo => "BundleInfo.json",
            Self::StorageSystem => "SFAStorageSystem.json",
            Self::Controller => "SFAController.json",
            Self::PowerBackup => "SFAUPS.json",
            Self::VirtualDisk => "SFAVirtualDisk.json",
            Self::ClientIoController => "SFAClientIOC.json",
        }
    }

    /// Returns true if only the first list entry of the member is meaningful.
    #[must_use]
    pub const fn first_entry_only(self) -> bool {
        matches!(
            self,
            Self::PlatformInfo | Self::StorageSystem | Self::Controller
        )
    }
}

impl std::fmt::Display for BundleMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Accepts a string or a number and yields it as text; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Entry of `BundleInfo.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Platform model (e.g. `AI400X2`).
    #[serde(rename = "Platform", default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    /// Serial number of controller 0.
    #[serde(
        rename = "Controller0Serial",
        default,
        deserialize_with = "lenient_string"
    )]
    pub controller0_serial: Option<String>,
    /// Serial number of controller 1.
    #[serde(
        rename = "Controller1Serial",
        default,
        deserialize_with = "lenient_string"
    )]
    pub controller1_serial: Option<String>,
}

/// Entry of `SFAStorageSystem.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSystemEntry {
    /// Name assigned to the storage system.
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Entry of `SFAController.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerEntry {
    /// Firmware release string.
    #[serde(rename = "FWRelease", default, deserialize_with = "lenient_string")]
    pub fw_release: Option<String>,
}

/// Entry of `SFAUPS.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerBackupEntry {
    /// Battery manufacture timestamp.
    #[serde(
        rename = "BatteryManufactureDate",
        default,
        deserialize_with = "lenient_string"
    )]
    pub manufacture_date: Option<String>,
    /// Precomputed expiration date, when firmware reports one.
    #[serde(
        rename = "BatteryExpirationDate",
        default,
        deserialize_with = "lenient_string"
    )]
    pub expiration_date: Option<String>,
}

/// Entry of `SFAVirtualDisk.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualDiskEntry {
    /// Virtual disk name; OST volumes contain `ost`.
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Typed capacity: a byte count or a unit token.
    #[serde(rename = "Capacity", default)]
    pub capacity: Option<serde_json::Value>,
    /// Free-form object descriptor embedding `Cap=` or `Capacity=`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub instance: Option<String>,
}

impl VirtualDiskEntry {
    /// Returns true if the volume is an object storage target.
    #[must_use]
    pub fn is_ost(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().contains("ost"))
    }
}

/// Entry of `SFAClientIOC.json`: one host-facing adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIoPort {
    /// Adapter description (e.g. `Mellanox ConnectX-6 ...`).
    #[serde(rename = "Description", default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Port type enum values (e.g. `IOC_PORT_TYPE_INFINIBAND`).
    #[serde(rename = "IOCPortTypes", default)]
    pub port_types: Vec<String>,
}

impl ClientIoPort {
    /// Returns true for Mellanox data-network adapters.
    #[must_use]
    pub fn is_mellanox(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.to_ascii_lowercase().contains("mellanox"))
    }
}

/// Facts extracted from one bundle, keyed by controller IP for the topology join.
///
/// Absent facts stay `None` (or 0 bytes); extraction never fails outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceInfo {
    /// Controller IP the bundle was collected from (from the archive name).
    pub controller_ip: Option<String>,
    /// Sum of OST virtual disk capacities, in bytes.
    pub capacity_bytes: u64,
    /// Platform model.
    pub platform_type: Option<String>,
    /// Controller firmware release.
    pub sfa_version: Option<String>,
    /// Storage system name.
    pub system_name: Option<String>,
    /// Serial number of controller 0.
    pub controller_c0_serial: Option<String>,
    /// Serial number of controller 1.
    pub controller_c1_serial: Option<String>,
    /// Expiration date (`YYYY-MM-DD`) of battery slot 1.
    pub bbu1_expired: Option<String>,
    /// Expiration date (`YYYY-MM-DD`) of battery slot 2.
    pub bbu2_expired: Option<String>,
    /// Every client I/O adapter listed in the bundle.
    pub client_io_ports: Vec<ClientIoPort>,
}

impl RawDeviceInfo {
    /// Creates an empty record for the given controller IP.
    #[must_use]
    pub fn new(controller_ip: Option<String>) -> Self {
        Self {
            controller_ip,
            ..Self::default()
        }
    }

    /// Capacity in bytes, or `None` when nothing was summed.
    #[must_use]
    pub const fn capacity(&self) -> Option<u64> {
        if self.capacity_bytes == 0 {
            None
        } else {
            Some(self.capacity_bytes)
        }
    }

    /// Returns true if nothing at all was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capacity_bytes == 0
            && self.platform_type.is_none()
            && self.sfa_version.is_none()
            && self.system_name.is_none()
            && self.controller_c0_serial.is_none()
            && self.controller_c1_serial.is_none()
            && self.bbu1_expired.is_none()
            && self.bbu2_expired.is_none()
            && self.client_io_ports.is_empty()
    }
}
