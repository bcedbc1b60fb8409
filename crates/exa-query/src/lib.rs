//! Query engine over persisted ExaScaler asset documents.
//!
//! A query loads one document, narrows its clusters by owner and then by cluster name,
//! and computes one of seven reports. Every failure comes back as a structured
//! `{error}` response rather than a panic or an `Err` past the boundary.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod filter;
pub mod listing;
pub mod reports;
pub mod request;

pub use engine::{query_document, run_query, run_query_with_config, QueryResponse};
pub use filter::filter_clusters;
pub use listing::{list_cluster_names, list_cluster_names_with_config, list_owners};
pub use reports::{Report, VersionSummary};
pub use request::{QueryRequest, ReportKind};

/// Convenient result alias sharing the `exa-core` error type.
pub type Result<T> = exa_core::Result<T>;
