//! Canonical asset inventory for ExaScaler clusters.
//!
//! Joins bundle facts to the cluster topology by controller IP, tracks which fields could
//! not be filled, and persists the result as a block-style YAML document that keeps the
//! owner tag across regenerations.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod document;
pub mod generate;
pub mod missing;
pub mod models;
pub mod yaml;

pub use builder::{build_cluster, BuildOutput, BundleIndex};
pub use document::{load_document, write_document};
pub use generate::{generate_document, Generated};
pub use missing::{MissingField, MissingFields, MissingLevel};
pub use models::{ClusterRecord, DeviceRecord, Document, HostAddresses, HostRecord, HOST_ROLE};
pub use yaml::to_block_yaml;

/// Convenient result alias sharing the `exa-core` error type.
pub type Result<T> = exa_core::Result<T>;
