//! Query entry points.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use exa_core::{Error, QueryConfig};
use exa_inventory::{load_document, Document};

use crate::filter::filter_clusters;
use crate::reports::Report;
use crate::request::QueryRequest;
use crate::Result;

/// Outcome of a query: a report, or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// The computed report
    Report(Report),
    /// What went wrong
    Error {
        /// One of the fixed error messages
        error: String,
    },
}

impl QueryResponse {
    /// The report, if the query succeeded.
    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        match self {
            Self::Report(report) => Some(report),
            Self::Error { .. } => None,
        }
    }

    /// The error message, if the query failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Report(_) => None,
            Self::Error { error } => Some(error),
        }
    }
}

impl From<Error> for QueryResponse {
    fn from(err: Error) -> Self {
        let error = match err {
            Error::NotFound(_) | Error::Io(_) => "file not found",
            Error::Document(_) => "unreadable document",
            Error::NoMatchingClusters => "no matching clusters",
            Error::InvalidReport(_) => "invalid report type",
            _ => "query failed",
        };
        Self::Error {
            error: error.to_string(),
        }
    }
}

/// Runs a query against the document at `path` with the default configuration.
#[must_use]
pub fn run_query(path: &Path, request: &QueryRequest) -> QueryResponse {
    run_query_with_config(path, request, &QueryConfig::default())
}

/// Runs a query against the document at `path`.
///
/// Checks happen in order: the document must be readable, the filters must leave at
/// least one cluster, and the report id must be 1-7.
#[must_use]
pub fn run_query_with_config(
    path: &Path,
    request: &QueryRequest,
    config: &QueryConfig,
) -> QueryResponse {
    let outcome =
        load_document(path).and_then(|document| query_document(&document, request, config));
    match outcome {
        Ok(report) => QueryResponse::Report(report),
        Err(err) => {
            warn!(path = %path.display(), report = request.report_id, %err, "query failed");
            QueryResponse::from(err)
        }
    }
}

/// Runs a query against an already loaded document.
///
/// # Errors
///
/// Returns [`Error::NoMatchingClusters`] if the filters leave nothing and
/// [`Error::InvalidReport`] for an unknown report id.
pub fn query_document(
    document: &Document,
    request: &QueryRequest,
    config: &QueryConfig,
) -> Result<Report> {
    let clusters = filter_clusters(
        &document.clusters,
        request.owner.as_deref(),
        request.cluster.as_deref(),
        config,
    );
    if clusters.is_empty() {
        return Err(Error::NoMatchingClusters);
    }

    let kind = request.kind()?;
    debug!(report = kind.id(), clusters = clusters.len(), "computing report");
    Ok(Report::compute(kind, &clusters, request.today, config))
}
