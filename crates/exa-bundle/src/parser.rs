//! Fact extraction from one bundle archive.
//!
//! Every member is handled independently: an absent or malformed member leaves its fields
//! null, logs a diagnostic, and the remaining members are still read. An archive that
//! cannot be opened at all yields an empty [`RawDeviceInfo`] and an error log.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

use exa_core::bbu::{format_expiration, BbuSlot};
use exa_core::capacity::{parse_typed, CapacityDialect};
use exa_core::{format_bytes, ExtractConfig};

use crate::archive::BundleArchive;
use crate::models::{
    BundleMember, ClientIoPort, ControllerEntry, PlatformEntry, PowerBackupEntry,
    RawDeviceInfo, StorageSystemEntry, VirtualDiskEntry,
};
use crate::Result;

/// Battery slots tracked per device.
const BBU_SLOTS: usize = 2;

static IP_PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// Extracts the controller IP embedded in a bundle file name, e.g.
/// `10.0.0.1-sfainfo.tar.gz`.
#[must_use]
pub fn controller_ip_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let pattern = IP_PATTERN
        .get_or_init(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}"))
        .as_ref()
        .ok()?;

    pattern
        .find_iter(&name)
        .map(|m| m.as_str())
        .find(|candidate| candidate.parse::<Ipv4Addr>().is_ok())
        .map(str::to_string)
}

/// Extracts device facts from a bundle using the default configuration.
#[must_use]
pub fn extract(archive_path: &Path) -> RawDeviceInfo {
    extract_with_config(archive_path, &ExtractConfig::default())
}

/// Extracts device facts from a bundle on disk.
#[must_use]
pub fn extract_with_config(archive_path: &Path, config: &ExtractConfig) -> RawDeviceInfo {
    let controller_ip = controller_ip_from_path(archive_path);
    if controller_ip.is_none() {
        warn!(
            path = %archive_path.display(),
            "bundle name carries no controller IP, it cannot join a device"
        );
    }

    info!(path = %archive_path.display(), "processing bundle");
    match BundleArchive::open(archive_path, config) {
        Ok(archive) => from_archive(&archive, controller_ip),
        Err(err) => {
            error!(path = %archive_path.display(), %err, "unreadable bundle archive");
            RawDeviceInfo::new(controller_ip)
        }
    }
}

/// Extracts device facts from a gzip-compressed tar stream.
#[must_use]
pub fn extract_from_reader<R: Read>(
    reader: R,
    controller_ip: Option<String>,
    config: &ExtractConfig,
) -> RawDeviceInfo {
    match BundleArchive::from_reader(reader, config) {
        Ok(archive) => from_archive(&archive, controller_ip),
        Err(err) => {
            error!(%err, "unreadable bundle stream");
            RawDeviceInfo::new(controller_ip)
        }
    }
}

fn from_archive(archive: &BundleArchive, controller_ip: Option<String>) -> RawDeviceInfo {
    let mut info = RawDeviceInfo::new(controller_ip);

    for member in BundleMember::ALL {
        let outcome = match member {
            BundleMember::PlatformInfo => apply_platform(archive, &mut info),
            BundleMember::StorageSystem => apply_storage_system(archive, &mut info),
            BundleMember::Controller => apply_controller(archive, &mut info),
            BundleMember::PowerBackup => apply_power_backup(archive, &mut info),
            BundleMember::VirtualDisk => apply_virtual_disks(archive, &mut info),
            BundleMember::ClientIoController => apply_client_io(archive, &mut info),
        };
        if let Err(err) = outcome {
            warn!(member = %member, %err, "skipping bundle member");
        }
    }

    debug!(
        ip = ?info.controller_ip,
        platform = ?info.platform_type,
        version = ?info.sfa_version,
        capacity = ?format_bytes(info.capacity()),
        "bundle extracted"
    );
    info
}

/// Decodes the first entry of a first-entry-only member.
fn first_entry<T: DeserializeOwned>(
    archive: &BundleArchive,
    member: BundleMember,
) -> Result<Option<T>> {
    let Some(first) = archive.read_list(member)?.into_iter().next() else {
        debug!(member = %member, "member list is empty");
        return Ok(None);
    };
    Ok(Some(serde_json::from_value(first)?))
}

/// Decodes every entry of a member, skipping entries that do not fit the model.
fn all_entries<T: DeserializeOwned>(archive: &BundleArchive, member: BundleMember) -> Result<Vec<T>> {
    let entries = archive
        .read_list(member)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(member = %member, index, %err, "skipping malformed entry");
                None
            }
        })
        .collect();
    Ok(entries)
}

fn apply_platform(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    if let Some(entry) = first_entry::<PlatformEntry>(archive, BundleMember::PlatformInfo)? {
        info.platform_type = entry.platform;
        info.controller_c0_serial = entry.controller0_serial;
        info.controller_c1_serial = entry.controller1_serial;
    }
    Ok(())
}

fn apply_storage_system(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    if let Some(entry) = first_entry::<StorageSystemEntry>(archive, BundleMember::StorageSystem)? {
        info.system_name = entry.name;
    }
    Ok(())
}

fn apply_controller(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    if let Some(entry) = first_entry::<ControllerEntry>(archive, BundleMember::Controller)? {
        info.sfa_version = entry.fw_release;
    }
    Ok(())
}

fn apply_power_backup(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    let member = BundleMember::PowerBackup;
    let slots = archive.read_list(member)?.into_iter().take(BBU_SLOTS);

    for (slot, value) in slots.enumerate() {
        let expiration = match serde_json::from_value::<PowerBackupEntry>(value) {
            Ok(entry) => BbuSlot::new(entry.expiration_date, entry.manufacture_date)
                .resolve()
                .map(format_expiration),
            Err(err) => {
                warn!(member = %member, slot = slot + 1, %err, "malformed battery entry");
                None
            }
        };
        match slot {
            0 => info.bbu1_expired = expiration,
            _ => info.bbu2_expired = expiration,
        }
    }
    Ok(())
}

fn apply_virtual_disks(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    let disks: Vec<VirtualDiskEntry> = all_entries(archive, BundleMember::VirtualDisk)?;

    let mut total: u64 = 0;
    for disk in disks.iter().filter(|disk| disk.is_ost()) {
        let bytes = ost_capacity(disk);
        let name = disk.name.as_deref().unwrap_or_default();
        if bytes == 0 {
            warn!(volume = name, "cannot determine OST capacity");
        } else {
            debug!(volume = name, bytes, "OST volume");
        }
        total = total.saturating_add(bytes);
    }

    info.capacity_bytes = total;
    Ok(())
}

/// Capacity of one OST volume: the embedded descriptor first, the typed field second.
fn ost_capacity(disk: &VirtualDiskEntry) -> u64 {
    let embedded = disk
        .instance
        .as_deref()
        .and_then(|descriptor| {
            CapacityDialect::detect(descriptor).map(|dialect| dialect.parse(descriptor))
        })
        .unwrap_or(0);

    if embedded > 0 {
        return embedded;
    }
    disk.capacity.as_ref().map_or(0, parse_typed)
}

fn apply_client_io(archive: &BundleArchive, info: &mut RawDeviceInfo) -> Result<()> {
    info.client_io_ports = all_entries::<ClientIoPort>(archive, BundleMember::ClientIoController)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exa_core::capacity::{parse_token, TIB};
    use std::path::PathBuf;

    #[test]
    fn test_controller_ip_from_path() {
        assert_eq!(
            controller_ip_from_path(Path::new("/tmp/up/10.0.0.1-sfainfo.tar.gz")).as_deref(),
            Some("10.0.0.1")
        );
        assert_eq!(
            controller_ip_from_path(Path::new("sfainfo_192.168.10.21_2024.tgz")).as_deref(),
            Some("192.168.10.21")
        );
        assert_eq!(controller_ip_from_path(Path::new("sfainfo.tar.gz")), None);
        assert_eq!(
            controller_ip_from_path(Path::new("999.1.1.1-sfainfo.tar.gz")),
            None
        );
    }

    #[test]
    fn test_ip_comes_from_file_name_only() {
        let path = PathBuf::from("/data/10.1.1.1/sfainfo.tar.gz");
        assert_eq!(controller_ip_from_path(&path), None);
    }

    #[test]
    fn test_ost_capacity_prefers_descriptor() {
        let disk = VirtualDiskEntry {
            name: Some("ost0000".to_string()),
            capacity: Some(serde_json::json!(1024)),
            instance: Some("VD(Name=ost0000, Cap=15.4 TiB, State=OK)".to_string()),
        };
        assert_eq!(ost_capacity(&disk), parse_token("15.4 TiB"));
    }

    #[test]
    fn test_ost_capacity_falls_back_to_typed_field() {
        let disk = VirtualDiskEntry {
            name: Some("ost0000".to_string()),
            capacity: Some(serde_json::json!("'2 TiB'")),
            instance: Some("VD(Name=ost0000, Cap=?? TiB)".to_string()),
        };
        assert_eq!(ost_capacity(&disk), 2 * TIB);

        let disk = VirtualDiskEntry {
            name: Some("ost0001".to_string()),
            capacity: Some(serde_json::json!(191_595_806_720_u64)),
            instance: None,
        };
        assert_eq!(ost_capacity(&disk), 191_595_806_720);
    }

    #[test]
    fn test_ost_capacity_unknown() {
        let disk = VirtualDiskEntry {
            name: Some("ost0002".to_string()),
            ..VirtualDiskEntry::default()
        };
        assert_eq!(ost_capacity(&disk), 0);
    }

    fn archive_with_ups(ups: &str) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(ups.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "sfa-logs/SFAUPS.json", ups.as_bytes())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_battery_slots_follow_list_position() {
        let bytes = archive_with_ups(r#"[null, {"BatteryManufactureDate": "2020-01-01"}]"#);
        let info = extract_from_reader(bytes.as_slice(), None, &ExtractConfig::default());
        assert_eq!(info.bbu1_expired, None);
        assert_eq!(info.bbu2_expired.as_deref(), Some("2024-12-30"));
    }

    #[test]
    fn test_battery_entries_beyond_two_ignored() {
        let bytes = archive_with_ups(
            r#"[{"BatteryExpirationDate": "2027-01-01"}, {}, {"BatteryExpirationDate": "2030-01-01"}]"#,
        );
        let info = extract_from_reader(bytes.as_slice(), None, &ExtractConfig::default());
        assert_eq!(info.bbu1_expired.as_deref(), Some("2027-01-01"));
        assert_eq!(info.bbu2_expired, None);
    }

    #[test]
    fn test_missing_archive_yields_empty_info() {
        let info = extract(Path::new("/nonexistent/10.0.0.7-sfainfo.tar.gz"));
        assert_eq!(info.controller_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(info.capacity_bytes, 0);
        assert!(info.is_empty());
    }
}
