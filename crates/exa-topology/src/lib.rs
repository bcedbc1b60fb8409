//! Topology extraction for ExaScaler clusters.
//!
//! Reads the cluster's `exascaler.toml` into typed device and host records: controller IP
//! pairs per storage array, and per host the management address plus ordered lnet
//! addresses derived from its Mellanox interfaces.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod extractor;
pub mod lnet;
pub mod models;

pub use extractor::{load_topology, parse_topology, Topology, TopologyDevice, TopologyHost};
pub use lnet::{lnet_addresses, InterfaceClass, LnetCandidate};
pub use models::{EmfSection, HostSection, NicSection, SfaSection};

/// Convenient result alias sharing the `exa-core` error type.
pub type Result<T> = exa_core::Result<T>;
