//! Identity extraction
//!
//! Two extractors exist, chosen when a run is configured:
//! - [`ColumnIdentity`]: tabular rows, a column resolved once against the header
//! - [`PathIdentity`]: nested records, a path expression evaluated per record

mod column;
mod path;

pub use column::{ColumnIdentity, ColumnRef};
pub use path::{JsonPath, PathIdentity};

use crate::error::Result;

/// Identity key of a record within one snapshot
pub type IdentityKey = String;

/// Derives a record's identity key.
///
/// Extraction is pure: the same record and locator always give the same key.
/// A locator that does not resolve for a record yields
/// [`DeltaError::IdentityNotFound`](crate::DeltaError::IdentityNotFound).
pub trait IdentityExtractor {
    type Record: ?Sized;

    fn extract(&self, record: &Self::Record) -> Result<IdentityKey>;
}
