//! Fingerprint tables: identity key -> digest
//!
//! Persisted as a flat JSON object `{"<identity>": "<hex digest>", ...}` with
//! keys in sorted order, so an unchanged table produces an identical file.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ahash::AHashMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{DeltaError, Result};
use crate::hash::Digest;
use crate::store;

/// In-memory fingerprint table
#[derive(Debug, Clone, Default)]
pub struct FingerprintTable {
    entries: AHashMap<String, Digest>,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Digest> {
        self.entries.get(key)
    }

    /// Insert or replace; returns the previous digest
    pub fn insert(&mut self, key: impl Into<String>, digest: Digest) -> Option<Digest> {
        self.entries.insert(key.into(), digest)
    }

    /// Remove an entry, returning its digest
    pub fn remove(&mut self, key: &str) -> Option<Digest> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Digest)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by identity key
    pub fn sorted(&self) -> BTreeMap<&str, &Digest> {
        self.iter().collect()
    }

    /// Load a table persisted by an earlier run.
    ///
    /// A file that cannot be opened is [`DeltaError::FingerprintUnreadable`];
    /// one that opens but does not hold a table is
    /// [`DeltaError::FingerprintUnparseable`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| DeltaError::FingerprintUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let table: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DeltaError::FingerprintUnparseable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        debug!(path = %path.display(), entries = table.len(), "loaded fingerprint table");
        Ok(table)
    }

    /// Persist the whole table atomically
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        store::write_json(path, self, pretty)
    }
}

impl PartialEq for FingerprintTable {
    fn eq(&self, other: &Self) -> bool {
        *self.entries == *other.entries
    }
}

impl Eq for FingerprintTable {}

impl FromIterator<(String, Digest)> for FingerprintTable {
    fn from_iter<I: IntoIterator<Item = (String, Digest)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FingerprintTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let sorted = self.sorted();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (key, digest) in sorted {
            map.serialize_entry(key, digest)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FingerprintTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = HashMap::<String, Digest>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
