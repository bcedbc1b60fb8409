//! # exa-core
//!
//! Core types and normalization rules shared by the ExaScaler asset inventory crates.
//!
//! This crate provides the shared error type, extraction configuration, and the two
//! leaf components every other crate builds on: capacity normalization and battery
//! backup (BBU) lifecycle calculation.
//!
//! ## Modules
//!
//! - [`error`] - Error type and stable error codes
//! - [`config`] - Extraction and query configuration
//! - [`capacity`] - Capacity token parsing and human formatting
//! - [`bbu`] - Battery backup unit expiration and remaining-life rules

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bbu;
pub mod capacity;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use capacity::{format_bytes, CapacityDialect, CapacityUnit};
pub use config::{ExtractConfig, QueryConfig};
pub use error::{Error, Result};
