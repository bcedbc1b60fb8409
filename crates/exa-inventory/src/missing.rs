//! Bookkeeping of fields that could not be filled during a build.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Level a missing field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLevel {
    /// Cluster-level field, keyed by field name
    Cluster,
    /// Device-level field, keyed `<device>:<field>`
    Device,
    /// Controller serial expected from a known controller address, keyed `<device>:<field>`
    Controller,
}

impl MissingLevel {
    /// Every level, in report order.
    pub const ALL: [Self; 3] = [Self::Cluster, Self::Device, Self::Controller];

    /// Heading used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cluster => "Cluster-level fields",
            Self::Device => "Device-level fields",
            Self::Controller => "Controller-level fields",
        }
    }
}

/// One missing field tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingField {
    /// Level of the field
    pub level: MissingLevel,
    /// Field key
    pub key: String,
}

/// Missing fields collected during a build, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFields {
    fields: Vec<MissingField>,
}

impl MissingFields {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a missing field.
    pub fn push(&mut self, level: MissingLevel, key: impl Into<String>) {
        self.fields.push(MissingField {
            level,
            key: key.into(),
        });
    }

    /// Records a device-scoped field as `<device>:<field>`.
    pub fn push_device_field(&mut self, level: MissingLevel, device: &str, field: &str) {
        self.push(level, format!("{device}:{field}"));
    }

    /// Keys recorded at `level`.
    #[must_use]
    pub fn at(&self, level: MissingLevel) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.level == level)
            .map(|field| field.key.as_str())
            .collect()
    }

    /// Cluster-level keys.
    #[must_use]
    pub fn cluster(&self) -> Vec<&str> {
        self.at(MissingLevel::Cluster)
    }

    /// Device-level keys.
    #[must_use]
    pub fn device(&self) -> Vec<&str> {
        self.at(MissingLevel::Device)
    }

    /// Controller-level keys.
    #[must_use]
    pub fn controller(&self) -> Vec<&str> {
        self.at(MissingLevel::Controller)
    }

    /// All tags.
    pub fn iter(&self) -> impl Iterator<Item = &MissingField> {
        self.fields.iter()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if nothing is missing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Three lines, one per level: `<heading>: a, b` or `<heading>: none`.
impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, level) in MissingLevel::ALL.into_iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let keys = self.at(level);
            if keys.is_empty() {
                write!(f, "{}: none", level.label())?;
            } else {
                write!(f, "{}: {}", level.label(), keys.join(", "))?;
            }
        }
        Ok(())
    }
}
