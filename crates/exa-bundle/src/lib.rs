//! SFA diagnostic bundle parsing.
//!
//! A bundle is a gzip-compressed tar archive of JSON snapshots taken from one storage
//! array. This crate pulls the handful of facts the inventory needs out of it (platform,
//! serial numbers, firmware, battery dates, OST capacity, client network adapters) into a
//! [`RawDeviceInfo`], recovering from every member-level failure.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archive;
pub mod models;
pub mod parser;

pub use archive::BundleArchive;
pub use models::{BundleMember, ClientIoPort, RawDeviceInfo};
pub use parser::{controller_ip_from_path, extract, extract_from_reader, extract_with_config};

/// Convenient result alias matching the shared error type.
pub type Result<T> = exa_core::Result<T>;
