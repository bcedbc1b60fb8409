//! Reading and writing the persisted asset document.
//!
//! A regeneration never silently drops an owner: when the caller supplies none, the
//! `customer` tag of the document being replaced is carried forward, and a cluster whose
//! fresh `Asset_owner` is only the pending placeholder inherits the previous owner.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use exa_core::{Error, ExtractConfig};

use crate::models::{ClusterRecord, Document};
use crate::yaml::to_block_yaml;
use crate::Result;

/// Reads a persisted document.
///
/// # Errors
///
/// Returns [`Error::NotFound`] or [`Error::Io`] if the file cannot be read, and
/// [`Error::Document`] if it is not a valid document.
pub fn load_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|e| {
        Error::Document(format!("invalid document {}: {e}", path.display()))
    })
}

/// Persists `cluster` at `path`, replacing any previous document.
///
/// A supplied `owner` is written verbatim as `customer`. Otherwise the previous document's
/// `customer` is kept; with neither, the document is written without one and a warning is
/// logged. The file is replaced atomically.
///
/// # Errors
///
/// Returns an error if the document cannot be rendered or written.
pub fn write_document(
    path: &Path,
    mut cluster: ClusterRecord,
    owner: Option<&str>,
    config: &ExtractConfig,
) -> Result<Document> {
    let supplied = owner
        .filter(|owner| !owner.trim().is_empty())
        .map(str::to_string);

    let customer = match supplied {
        Some(owner) => {
            debug!(owner = %owner, "using supplied owner");
            Some(owner)
        }
        None => {
            let previous = previous_document(path);
            let customer = previous.as_ref().and_then(|doc| doc.customer.clone());
            if let Some(customer) = customer.as_deref() {
                info!(customer, "keeping owner from the previous document");
            }
            promote_owner(&mut cluster, previous.as_ref(), customer.as_deref(), config);
            customer
        }
    };

    if customer.is_none() {
        warn!(path = %path.display(), "no owner available, writing document without customer");
    }

    let document = Document::new(customer, cluster);
    let text = to_block_yaml(&document)?;
    write_atomically(path, text.as_bytes())?;
    info!(path = %path.display(), "document written");
    Ok(document)
}

/// Replaces a placeholder `Asset_owner` with the previously persisted owner.
fn promote_owner(
    cluster: &mut ClusterRecord,
    previous: Option<&Document>,
    customer: Option<&str>,
    config: &ExtractConfig,
) {
    if !config.is_pending_owner(cluster.asset_owner.as_deref()) {
        return;
    }

    let carried = previous
        .and_then(|doc| doc.cluster(&cluster.name))
        .and_then(|previous| previous.asset_owner.as_deref())
        .filter(|owner| !config.is_pending_owner(Some(owner)))
        .or(customer.filter(|owner| !config.is_pending_owner(Some(owner))));

    if let Some(owner) = carried {
        debug!(cluster = %cluster.name, owner, "carrying asset owner forward");
        cluster.asset_owner = Some(owner.to_string());
    }
}

/// The document currently at `path`, if there is a readable one.
fn previous_document(path: &Path) -> Option<Document> {
    if !path.exists() {
        return None;
    }
    match load_document(path) {
        Ok(document) => Some(document),
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot read previous document");
            None
        }
    }
}

/// Writes through a temporary file in the destination directory, then renames it.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cluster(owner: Option<&str>) -> ClusterRecord {
        let config = ExtractConfig::default();
        ClusterRecord {
            name: "exa1".to_string(),
            asset_owner: Some(owner.unwrap_or(config.owner_placeholder.as_str()).to_string()),
            ..ClusterRecord::default()
        }
    }

    #[test]
    fn test_owner_survives_regeneration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exa1.yaml");
        let config = ExtractConfig::default();

        write_document(&path, cluster(Some("Acme")), Some("Acme"), &config).unwrap();
        assert_eq!(load_document(&path).unwrap().customer.as_deref(), Some("Acme"));

        let written = write_document(&path, cluster(None), None, &config).unwrap();
        assert_eq!(written.customer.as_deref(), Some("Acme"));
        let reloaded = load_document(&path).unwrap();
        assert_eq!(reloaded.customer.as_deref(), Some("Acme"));
        assert_eq!(reloaded.clusters[0].asset_owner.as_deref(), Some("Acme"));

        write_document(&path, cluster(Some("NewCo")), Some("NewCo"), &config).unwrap();
        let reloaded = load_document(&path).unwrap();
        assert_eq!(reloaded.customer.as_deref(), Some("NewCo"));
        assert_eq!(reloaded.clusters[0].asset_owner.as_deref(), Some("NewCo"));
    }

    #[test]
    fn test_supplied_owner_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exa1.yaml");
        let config = ExtractConfig::default();

        write_document(&path, cluster(Some("Acme")), Some("Acme"), &config).unwrap();
        let written = write_document(&path, cluster(None), Some("  "), &config).unwrap();
        assert_eq!(written.customer.as_deref(), Some("Acme"));

        let written =
            write_document(&path, cluster(Some(" NewCo ")), Some(" NewCo "), &config).unwrap();
        assert_eq!(written.customer.as_deref(), Some(" NewCo "));
        assert_eq!(load_document(&path).unwrap().customer.as_deref(), Some(" NewCo "));
    }

    #[test]
    fn test_no_owner_anywhere() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exa1.yaml");
        let config = ExtractConfig::default();

        let written = write_document(&path, cluster(None), None, &config).unwrap();
        assert_eq!(written.customer, None);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("customer:"));
        assert!(text.starts_with("clusters:\n  - Cluster_name: exa1\n"));
        assert!(text.contains(&format!("Asset_owner: {}", config.owner_placeholder)));
    }

    #[test]
    fn test_hand_edited_cluster_owner_preferred() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exa1.yaml");
        std::fs::write(
            &path,
            "customer: Acme\nclusters:\n  - Cluster_name: exa1\n    Asset_owner: Acme Research\n",
        )
        .unwrap();

        let written =
            write_document(&path, cluster(None), None, &ExtractConfig::default()).unwrap();
        assert_eq!(written.customer.as_deref(), Some("Acme"));
        assert_eq!(written.clusters[0].asset_owner.as_deref(), Some("Acme Research"));
    }

    #[test]
    fn test_unreadable_previous_document_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exa1.yaml");
        std::fs::write(&path, "clusters: [unterminated").unwrap();

        let written =
            write_document(&path, cluster(None), None, &ExtractConfig::default()).unwrap();
        assert_eq!(written.customer, None);
        assert!(load_document(&path).is_ok());
    }

    #[test]
    fn test_load_missing_document() {
        let result = load_document(Path::new("/nonexistent/exa1.yaml"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "clusters: [unterminated").unwrap();
        assert!(matches!(load_document(&path), Err(Error::Document(_))));
    }
}
