//! Owner and cluster filters.

use exa_core::QueryConfig;
use exa_inventory::ClusterRecord;

/// Narrows clusters by owner, then by cluster name; both compare case-insensitively.
///
/// An absent or blank filter matches everything, and the all-clusters sentinel disables
/// the cluster filter.
#[must_use]
pub fn filter_clusters<'a>(
    clusters: &'a [ClusterRecord],
    owner: Option<&str>,
    cluster: Option<&str>,
    config: &QueryConfig,
) -> Vec<&'a ClusterRecord> {
    let owner = active(owner);
    let cluster = active(cluster).filter(|name| !config.is_all_clusters(name));

    clusters
        .iter()
        .filter(|record| {
            owner.map_or(true, |owner| {
                record
                    .asset_owner
                    .as_deref()
                    .is_some_and(|value| same_text(value, owner))
            })
        })
        .filter(|record| cluster.map_or(true, |name| same_text(&record.name, name)))
        .collect()
}

fn active(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|value| !value.is_empty())
}

fn same_text(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str, owner: Option<&str>) -> ClusterRecord {
        ClusterRecord {
            name: name.to_string(),
            asset_owner: owner.map(str::to_string),
            ..ClusterRecord::default()
        }
    }

    fn names(clusters: &[&ClusterRecord]) -> Vec<String> {
        clusters.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_owner_is_case_insensitive() {
        let clusters = vec![cluster("exa1", Some("IDEA")), cluster("exa2", Some("Acme"))];
        let config = QueryConfig::default();
        let matched = filter_clusters(&clusters, Some("ideA"), None, &config);
        assert_eq!(names(&matched), vec!["exa1"]);
    }

    #[test]
    fn test_owner_then_cluster() {
        let clusters = vec![
            cluster("exa1", Some("IDEA")),
            cluster("exa2", Some("IDEA")),
            cluster("exa1", Some("Acme")),
        ];
        let config = QueryConfig::default();
        let matched = filter_clusters(&clusters, Some("idea"), Some("EXA1"), &config);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].asset_owner.as_deref(), Some("IDEA"));
    }

    #[test]
    fn test_sentinel_disables_cluster_filter() {
        let clusters = vec![cluster("exa1", Some("IDEA")), cluster("exa2", Some("IDEA"))];
        let config = QueryConfig::default();
        let matched = filter_clusters(&clusters, None, Some("all clusters"), &config);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_blank_filters_match_everything() {
        let clusters = vec![cluster("exa1", None), cluster("exa2", Some("IDEA"))];
        let config = QueryConfig::default();
        assert_eq!(filter_clusters(&clusters, Some(" "), Some(""), &config).len(), 2);
    }

    #[test]
    fn test_owner_filter_skips_unowned() {
        let clusters = vec![cluster("exa1", None)];
        let config = QueryConfig::default();
        assert!(filter_clusters(&clusters, Some("IDEA"), None, &config).is_empty());
    }
}
