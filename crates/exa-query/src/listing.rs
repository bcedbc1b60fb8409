//! Owner and cluster name listings for selection menus.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use exa_core::QueryConfig;
use exa_inventory::{load_document, Document};

use crate::filter::filter_clusters;

fn document_at(path: &Path) -> Option<Document> {
    match load_document(path) {
        Ok(document) => Some(document),
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot list from document");
            None
        }
    }
}

/// Sorted distinct owners of the clusters in the document at `path`.
///
/// A missing or unreadable document yields an empty list.
#[must_use]
pub fn list_owners(path: &Path) -> Vec<String> {
    let Some(document) = document_at(path) else {
        return Vec::new();
    };
    document
        .clusters
        .iter()
        .filter_map(|cluster| cluster.asset_owner.as_deref())
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Cluster names for a selection menu, using the default configuration.
#[must_use]
pub fn list_cluster_names(path: &Path, owner: Option<&str>) -> Vec<String> {
    list_cluster_names_with_config(path, owner, &QueryConfig::default())
}

/// The all-clusters sentinel followed by the sorted distinct cluster names, optionally
/// restricted to one owner.
///
/// A missing or unreadable document yields an empty list.
#[must_use]
pub fn list_cluster_names_with_config(
    path: &Path,
    owner: Option<&str>,
    config: &QueryConfig,
) -> Vec<String> {
    let Some(document) = document_at(path) else {
        return Vec::new();
    };
    let names: BTreeSet<&str> = filter_clusters(&document.clusters, owner, None, config)
        .into_iter()
        .map(|cluster| cluster.name.trim())
        .filter(|name| !name.is_empty())
        .collect();

    std::iter::once(config.all_clusters_sentinel.clone())
        .chain(names.into_iter().map(str::to_string))
        .collect()
}
