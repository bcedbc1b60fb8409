//! One regeneration run: topology plus bundles in, persisted document out.

use std::path::Path;
use tracing::info;

use exa_bundle::extract_with_config;
use exa_core::ExtractConfig;
use exa_topology::load_topology;

use crate::builder::build_cluster;
use crate::document::write_document;
use crate::missing::MissingFields;
use crate::models::Document;
use crate::Result;

/// Result of a regeneration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    /// The document as written.
    pub document: Document,
    /// Fields left for manual completion.
    pub missing: MissingFields,
}

/// Builds and persists the document for one cluster.
///
/// Bundles are processed sequentially; an unreadable bundle only nulls its own facts.
///
/// # Errors
///
/// Returns an error if the topology cannot be read or the document cannot be written.
pub fn generate_document<P: AsRef<Path>>(
    topology_path: &Path,
    cluster_name: &str,
    bundle_paths: &[P],
    output_path: &Path,
    owner: Option<&str>,
    config: &ExtractConfig,
) -> Result<Generated> {
    let topology = load_topology(topology_path, config)?;
    let bundles: Vec<_> = bundle_paths
        .iter()
        .map(|path| extract_with_config(path.as_ref(), config))
        .collect();

    let output = build_cluster(cluster_name, &topology, &bundles, owner, config);
    let document = write_document(output_path, output.cluster, owner, config)?;
    info!(
        cluster = cluster_name,
        path = %output_path.display(),
        missing = output.missing.len(),
        "cluster document generated"
    );

    Ok(Generated {
        document,
        missing: output.missing,
    })
}
