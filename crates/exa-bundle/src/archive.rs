//! Access to the JSON members of a gzip-compressed bundle archive.

use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use exa_core::{Error, ExtractConfig};

use crate::models::BundleMember;
use crate::Result;

/// The consulted members of one bundle, read into memory in a single pass.
#[derive(Debug, Clone, Default)]
pub struct BundleArchive {
    members: HashMap<BundleMember, Vec<u8>>,
}

impl BundleArchive {
    /// Opens and reads a bundle archive from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid tar.gz stream.
    pub fn open(path: &Path, config: &ExtractConfig) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, config)
    }

    /// Reads a bundle archive from any gzip-compressed tar stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if decompression or tar decoding fails.
    pub fn from_reader<R: Read>(reader: R, config: &ExtractConfig) -> Result<Self> {
        let wanted: HashMap<String, BundleMember> = BundleMember::ALL
            .iter()
            .map(|member| (config.member_path(member.file_name()), *member))
            .collect();

        let mut archive = tar::Archive::new(GzDecoder::new(reader));
        let mut members = HashMap::new();

        for entry in archive.entries().map_err(archive_error)? {
            let mut entry = entry.map_err(archive_error)?;
            let path = entry
                .path()
                .map_err(archive_error)?
                .to_string_lossy()
                .trim_start_matches("./")
                .to_string();

            if let Some(member) = wanted.get(&path) {
                let mut content = Vec::new();
                entry.read_to_end(&mut content).map_err(archive_error)?;
                debug!(member = %member, bytes = content.len(), "read bundle member");
                members.insert(*member, content);
            }
        }

        Ok(Self { members })
    }

    /// Returns true if the member was present in the archive.
    #[must_use]
    pub fn contains(&self, member: BundleMember) -> bool {
        self.members.contains_key(&member)
    }

    /// Number of consulted members found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if none of the consulted members were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Raw bytes of a member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMember`] if the member was absent.
    pub fn member_bytes(&self, member: BundleMember) -> Result<&[u8]> {
        self.members
            .get(&member)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingMember(member.file_name().to_string()))
    }

    /// Decodes a member as a JSON list.
    ///
    /// # Errors
    ///
    /// Returns an error if the member is absent, is not JSON, or is not a list.
    pub fn read_list(&self, member: BundleMember) -> Result<Vec<serde_json::Value>> {
        let bytes = self.member_bytes(member)?;
        match serde_json::from_slice::<serde_json::Value>(bytes)? {
            serde_json::Value::Array(entries) => Ok(entries),
            other => Err(Error::Json(format!(
                "{member}: expected a list, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn archive_error(err: std::io::Error) -> Error {
    Error::Archive(err.to_string())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
