use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::ObjectHash;

/// Sentinel digest value for manifest entries without content (directories).
pub const NOHASH: &str = "nohash";

/// One checked-in tree snapshot: relative path → content digest.
///
/// Paths are relative to the checkin root and use forward-slash separators.
/// File entries carry the lowercase hex SHA-256 of the file content;
/// directory entries carry the [`NOHASH`] sentinel. A manifest is itself
/// ordinary object content — it is serialized, hashed, and stored exactly
/// like a file blob, so a label can point at it by content hash.
///
/// Entries live in a `BTreeMap` so the serialized form is canonical: checking
/// in an unchanged tree twice produces byte-identical manifests and therefore
/// the same manifest hash.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file entry with its content digest.
    pub fn insert_file(&mut self, path: impl Into<String>, hash: &ObjectHash) {
        self.entries.insert(path.into(), hash.to_hex());
    }

    /// Record a directory entry (no content digest).
    pub fn insert_dir(&mut self, path: impl Into<String>) {
        self.entries.insert(path.into(), NOHASH.to_string());
    }

    /// Look up the raw digest string for a path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Iterate over all entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    /// Decode all file entries into `(path, hash)` pairs, skipping
    /// directories. Fails on any digest that is not valid 32-byte hex.
    pub fn file_entries(&self) -> Result<Vec<(String, ObjectHash)>, TypeError> {
        self.entries
            .iter()
            .filter(|(_, digest)| digest.as_str() != NOHASH)
            .map(|(path, digest)| Ok((path.clone(), ObjectHash::from_hex(digest)?)))
            .collect()
    }

    /// Paths of all directory entries.
    pub fn dir_entries(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, digest)| digest.as_str() == NOHASH)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the canonical wire/storage encoding (sorted-key JSON).
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(&self.entries).map_err(|e| TypeError::Encode(e.to_string()))
    }

    /// Decode from the canonical encoding.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        let entries: BTreeMap<String, String> = serde_json::from_slice(data)
            .map_err(|e| TypeError::MalformedManifest(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Content hash of the canonical encoding.
    pub fn content_hash(&self) -> Result<ObjectHash, TypeError> {
        Ok(ObjectHash::of(&self.to_bytes()?))
    }
}
