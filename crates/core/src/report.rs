//! Run summary and side reports

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::IdentityKey;
use crate::store;
use crate::table::FingerprintTable;

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Data records read from the source
    pub records: u64,
    /// Distinct identities (entries in the new fingerprint table)
    pub unique: u64,
    /// Records written to the delta
    pub delta: u64,
    pub new: u64,
    pub changed: u64,
    pub unchanged: u64,
    /// Previous identities with no match in this snapshot
    pub removed: u64,
    /// Extra occurrences of an already seen identity
    pub duplicates: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} records, {} unique IDs, found {} changed and {} removed entries",
            self.records, self.unique, self.delta, self.removed
        )
    }
}

/// Write the duplicate log (JSON array, indent 2)
pub fn write_duplicates(path: &Path, duplicates: &[IdentityKey]) -> Result<()> {
    store::write_json(path, duplicates, true)
}

/// Write the removed identities with their last known digests (JSON object, indent 2)
pub fn write_removed(path: &Path, removed: &FingerprintTable) -> Result<()> {
    store::write_json(path, removed, true)
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    store::write_json(path, summary, true)
}
