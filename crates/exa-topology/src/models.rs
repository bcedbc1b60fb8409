//! Typed sections of the topology document.
//!
//! Each section is decoded on its own so a malformed entry only nulls that entry.

use serde::{Deserialize, Serialize};

/// The `[EMF]` management section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmfSection {
    /// Management-plane address of the cluster.
    #[serde(default)]
    pub ip: Option<String>,
}

/// One `[sfa.<name>]` storage array section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SfaSection {
    /// Controller addresses, ordered c0 then c1.
    #[serde(default)]
    pub controllers: Vec<toml::Value>,
}

impl SfaSection {
    /// Address of controller `index`, if present and a string.
    #[must_use]
    pub fn controller(&self, index: usize) -> Option<String> {
        self.controllers
            .get(index)
            .and_then(toml::Value::as_str)
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
    }
}

/// One `[host.<name>]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSection {
    /// Name of the storage array this host is attached to.
    #[serde(default)]
    pub sfa: Option<String>,
    /// Network interfaces keyed by interface name, in document order.
    #[serde(default)]
    pub nic: toml::Table,
}

/// One `[host.<name>.nic.<iface>]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicSection {
    /// Interface address; absent for unconfigured interfaces.
    #[serde(default)]
    pub ip: Option<String>,
}

impl NicSection {
    /// The address if it is set and non-blank.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty())
    }
}
