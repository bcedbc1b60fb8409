//! Topology document extraction.
//!
//! The document carries a `version` scalar, an `[EMF]` section with the management
//! address, one `[sfa.<name>]` section per storage array and one `[host.<name>]` section
//! per server. Section order is kept as written.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use exa_core::{Error, ExtractConfig};

use crate::lnet::lnet_addresses;
use crate::models::{EmfSection, HostSection, NicSection, SfaSection};
use crate::Result;

/// Top-level shape of the document; sections are decoded individually afterwards.
#[derive(Debug, Default, Deserialize)]
struct TopologyFile {
    #[serde(default)]
    version: Option<toml::Value>,
    #[serde(rename = "EMF", default)]
    emf: Option<toml::Value>,
    #[serde(default)]
    sfa: toml::Table,
    #[serde(default)]
    host: toml::Table,
}

/// A storage array with its controller address pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDevice {
    /// Section name of the array.
    pub name: String,
    /// Address of controller 0.
    pub controller_c0_ip: Option<String>,
    /// Address of controller 1.
    pub controller_c1_ip: Option<String>,
}

impl TopologyDevice {
    /// Both controller addresses that are set, c0 first.
    pub fn controller_ips(&self) -> impl Iterator<Item = &str> {
        [&self.controller_c0_ip, &self.controller_c1_ip]
            .into_iter()
            .filter_map(|ip| ip.as_deref())
    }
}

/// A server attached to a storage array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyHost {
    /// Section name of the host.
    pub hostname: String,
    /// Name of the owning storage array.
    pub device: Option<String>,
    /// Address of the management interface.
    pub management_ip: Option<String>,
    /// Retained lnet addresses in slot order.
    pub lnet: Vec<String>,
}

impl TopologyHost {
    /// lnet address of 1-based `slot`.
    #[must_use]
    pub fn lnet_slot(&self, slot: usize) -> Option<&str> {
        slot.checked_sub(1)
            .and_then(|index| self.lnet.get(index))
            .map(String::as_str)
    }
}

/// Everything read from one topology document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Software version tag.
    pub version: Option<String>,
    /// Management-plane address.
    pub emf_ip: Option<String>,
    /// Storage arrays in document order.
    pub devices: Vec<TopologyDevice>,
    /// Hosts in document order.
    pub hosts: Vec<TopologyHost>,
}

impl Topology {
    /// Hosts attached to the named device, in document order.
    pub fn hosts_for<'a>(&'a self, device: &'a str) -> impl Iterator<Item = &'a TopologyHost> + 'a {
        self.hosts
            .iter()
            .filter(move |host| host.device.as_deref() == Some(device))
    }
}

/// Reads and parses a topology document from disk.
///
/// # Errors
///
/// Returns [`Error::NotFound`] or [`Error::Io`] if the file cannot be read, and
/// [`Error::Topology`] if it is not a TOML document.
pub fn load_topology(path: &Path, config: &ExtractConfig) -> Result<Topology> {
    info!(path = %path.display(), "loading topology");
    let text = std::fs::read_to_string(path)?;
    parse_topology(&text, config)
}

/// Parses a topology document.
///
/// Only a document that is not TOML at all fails; malformed sections are skipped or
/// nulled with a warning.
///
/// # Errors
///
/// Returns [`Error::Topology`] if the text cannot be decoded.
pub fn parse_topology(text: &str, config: &ExtractConfig) -> Result<Topology> {
    let file: TopologyFile =
        toml::from_str(text).map_err(|e| Error::Topology(format!("invalid topology: {e}")))?;

    let version = file.version.as_ref().and_then(scalar_text);
    if version.is_none() {
        warn!("topology carries no version");
    }

    let emf_ip = file
        .emf
        .and_then(|value| section::<EmfSection>("EMF", value))
        .and_then(|emf| emf.ip);

    let devices = file
        .sfa
        .into_iter()
        .map(|(name, value)| {
            let sfa = section::<SfaSection>(&name, value).unwrap_or_default();
            TopologyDevice {
                controller_c0_ip: sfa.controller(0),
                controller_c1_ip: sfa.controller(1),
                name,
            }
        })
        .collect();

    let hosts = file
        .host
        .into_iter()
        .filter_map(|(hostname, value)| {
            section::<HostSection>(&hostname, value).map(|host| build_host(hostname, host, config))
        })
        .collect();

    let topology = Topology {
        version,
        emf_ip,
        devices,
        hosts,
    };
    debug!(
        devices = topology.devices.len(),
        hosts = topology.hosts.len(),
        "topology parsed"
    );
    Ok(topology)
}

fn build_host(hostname: String, section: HostSection, config: &ExtractConfig) -> TopologyHost {
    let nics: Vec<(String, NicSection)> = section
        .nic
        .into_iter()
        .filter_map(|(name, value)| {
            let nic = section_of::<NicSection>(&hostname, &name, value)?;
            Some((name, nic))
        })
        .collect();

    let management_ip = nics
        .iter()
        .find(|(name, _)| *name == config.management_interface)
        .and_then(|(_, nic)| nic.address())
        .map(str::to_string);

    let mut lnet = lnet_addresses(nics.iter().map(|(name, nic)| (name.as_str(), nic.address())));
    if lnet.len() > config.lnet_slots {
        debug!(
            host = %hostname,
            dropped = ?&lnet[config.lnet_slots..],
            "lnet addresses beyond the stored slots"
        );
        lnet.truncate(config.lnet_slots);
    }

    TopologyHost {
        hostname,
        device: section.sfa,
        management_ip,
        lnet,
    }
}

/// Renders a scalar version value as text; strings, integers and floats are accepted.
fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        _ => None,
    }
}

fn section<T: DeserializeOwned>(name: &str, value: toml::Value) -> Option<T> {
    match value.try_into() {
        Ok(section) => Some(section),
        Err(err) => {
            warn!(section = name, %err, "skipping malformed topology section");
            None
        }
    }
}

fn section_of<T: DeserializeOwned>(host: &str, name: &str, value: toml::Value) -> Option<T> {
    match value.try_into() {
        Ok(section) => Some(section),
        Err(err) => {
            warn!(host, interface = name, %err, "skipping malformed interface");
            None
        }
    }
}
