//! Lustre network (lnet) address derivation from host interfaces.
//!
//! Only Mellanox interfaces take part: `mlxib*` (InfiniBand, `o2ib`) and `mlxen*`
//! (Ethernet, `tcp`). Candidates order InfiniBand before Ethernet, then by ascending
//! numeric suffix; a missing or non-numeric suffix counts as 0.

use std::cmp::Ordering;

/// Transport class of an lnet-capable interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InterfaceClass {
    /// `mlxib*` interfaces, reached over `o2ib`
    InfiniBand,
    /// `mlxen*` interfaces, reached over `tcp`
    Ethernet,
}

impl InterfaceClass {
    /// Interface name prefix for the class.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::InfiniBand => "mlxib",
            Self::Ethernet => "mlxen",
        }
    }

    /// lnet network type for the class.
    #[must_use]
    pub const fn network(self) -> &'static str {
        match self {
            Self::InfiniBand => "o2ib",
            Self::Ethernet => "tcp",
        }
    }

    /// Classifies an interface name, returning the class and the unprefixed suffix.
    #[must_use]
    pub fn classify(interface: &str) -> Option<(Self, &str)> {
        [Self::InfiniBand, Self::Ethernet]
            .into_iter()
            .find_map(|class| {
                interface
                    .strip_prefix(class.prefix())
                    .map(|suffix| (class, suffix))
            })
    }
}

/// An interface that yields an lnet address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnetCandidate {
    /// Interface name, e.g. `mlxib0`
    pub interface: String,
    /// Transport class
    pub class: InterfaceClass,
    /// Numeric suffix of the interface name
    pub index: u32,
    /// Configured address
    pub ip: String,
}

impl LnetCandidate {
    /// Builds a candidate from an interface and its address.
    ///
    /// Returns `None` for non-Mellanox interfaces and blank addresses.
    #[must_use]
    pub fn new(interface: &str, ip: &str) -> Option<Self> {
        let ip = ip.trim();
        if ip.is_empty() {
            return None;
        }
        let (class, suffix) = InterfaceClass::classify(interface)?;
        Some(Self {
            interface: interface.to_string(),
            class,
            index: suffix.parse().unwrap_or(0),
            ip: ip.to_string(),
        })
    }

    /// The lnet address, e.g. `192.168.10.1@o2ib0`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}@{}{}", self.ip, self.class.network(), self.index)
    }
}

impl Ord for LnetCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class
            .cmp(&other.class)
            .then(self.index.cmp(&other.index))
            .then_with(|| self.interface.cmp(&other.interface))
    }
}

impl PartialOrd for LnetCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Computes every lnet address of a host in slot order.
///
/// Interfaces without an address are skipped.
pub fn lnet_addresses<'a, I>(interfaces: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut candidates: Vec<LnetCandidate> = interfaces
        .into_iter()
        .filter_map(|(name, ip)| LnetCandidate::new(name, ip?))
        .collect();
    candidates.sort();
    candidates.iter().map(LnetCandidate::address).collect()
}
