//! Configuration structures for extraction and queries.
//!
//! This module provides the knobs the hosting application may override: where bundle
//! members live inside an archive, which interface carries the management address, and
//! the placeholder strings written for values that are filled in later by hand.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Default directory holding the JSON members inside a bundle archive.
pub const DEFAULT_BUNDLE_ROOT: &str = "sfa-logs";
/// Default interface name carrying a host's management address.
pub const DEFAULT_MANAGEMENT_INTERFACE: &str = "mgmt0";
/// Default owner placeholder written until a customer is chosen.
pub const DEFAULT_OWNER_PLACEHOLDER: &str = "Pending customer selection";
/// Default support status placeholder.
pub const DEFAULT_SUPPORT_STATUS: &str = "To be filled";
/// Number of lnet address slots a host record stores.
pub const MAX_LNET_SLOTS: usize = 2;
/// Cluster filter value that disables cluster filtering.
pub const DEFAULT_ALL_CLUSTERS: &str = "All clusters";
/// Rendering used in reports for absent values.
pub const DEFAULT_NOT_AVAILABLE: &str = "N/A";

/// Configuration for turning a topology document and bundles into a cluster record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ExtractConfig {
    /// Directory prefix of the JSON members inside each bundle archive
    #[validate(length(min = 1))]
    #[serde(default = "default_bundle_root")]
    pub bundle_root: String,

    /// Interface whose address becomes the host's management IP
    #[validate(length(min = 1))]
    #[serde(default = "default_management_interface")]
    pub management_interface: String,

    /// Asset owner written when the caller supplies none
    #[validate(length(min = 1))]
    #[serde(default = "default_owner_placeholder")]
    pub owner_placeholder: String,

    /// Support status written on every freshly built cluster
    #[validate(length(min = 1))]
    #[serde(default = "default_support_status")]
    pub support_status_placeholder: String,

    /// Number of ordered lnet addresses retained per host
    #[validate(range(min = 1, max = 2))]
    #[serde(default = "default_lnet_slots")]
    pub lnet_slots: usize,
}

fn default_bundle_root() -> String {
    DEFAULT_BUNDLE_ROOT.to_string()
}

fn default_management_interface() -> String {
    DEFAULT_MANAGEMENT_INTERFACE.to_string()
}

fn default_owner_placeholder() -> String {
    DEFAULT_OWNER_PLACEHOLDER.to_string()
}

fn default_support_status() -> String {
    DEFAULT_SUPPORT_STATUS.to_string()
}

const fn default_lnet_slots() -> usize {
    MAX_LNET_SLOTS
}

impl ExtractConfig {
    /// Create a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundle_root: default_bundle_root(),
            management_interface: default_management_interface(),
            owner_placeholder: default_owner_placeholder(),
            support_status_placeholder: default_support_status(),
            lnet_slots: default_lnet_slots(),
        }
    }

    /// Parse a TOML overlay; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::ConfigError(format!("Invalid extract configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read configuration {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the member directory inside bundle archives.
    #[must_use]
    pub fn with_bundle_root(mut self, root: impl Into<String>) -> Self {
        self.bundle_root = root.into();
        self
    }

    /// Set the management interface name.
    #[must_use]
    pub fn with_management_interface(mut self, name: impl Into<String>) -> Self {
        self.management_interface = name.into();
        self
    }

    /// Set the owner placeholder.
    #[must_use]
    pub fn with_owner_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.owner_placeholder = placeholder.into();
        self
    }

    /// Set the number of retained lnet slots.
    #[must_use]
    pub const fn with_lnet_slots(mut self, slots: usize) -> Self {
        self.lnet_slots = slots;
        self
    }

    /// Full archive path of a bundle member file.
    #[must_use]
    pub fn member_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.bundle_root.trim_end_matches('/'))
    }

    /// Returns true if `owner` is absent, blank or the pending placeholder.
    #[must_use]
    pub fn is_pending_owner(&self, owner: Option<&str>) -> bool {
        match owner.map(str::trim) {
            None | Some("") => true,
            Some(owner) => owner == self.owner_placeholder,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the query engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QueryConfig {
    /// Cluster filter value meaning "do not filter by cluster"
    #[validate(length(min = 1))]
    #[serde(default = "default_all_clusters")]
    pub all_clusters_sentinel: String,

    /// Text rendered for absent values
    #[serde(default = "default_not_available")]
    pub not_available: String,
}

fn default_all_clusters() -> String {
    DEFAULT_ALL_CLUSTERS.to_string()
}

fn default_not_available() -> String {
    DEFAULT_NOT_AVAILABLE.to_string()
}

impl QueryConfig {
    /// Create a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_clusters_sentinel: default_all_clusters(),
            not_available: default_not_available(),
        }
    }

    /// Set the all-clusters sentinel.
    #[must_use]
    pub fn with_all_clusters_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.all_clusters_sentinel = sentinel.into();
        self
    }

    /// Returns true if `value` is the all-clusters sentinel (case-insensitive).
    #[must_use]
    pub fn is_all_clusters(&self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(&self.all_clusters_sentinel)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new()
    }
}
