//! Error types for delta runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a delta run.
///
/// Duplicate and removed identities are not errors; they are collected by the
/// engine and reported when the run completes.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// The identity locator did not resolve for a record
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// The named (or indexed) identity column is absent from the header row
    #[error("identity column '{column}' not found in header [{header}]")]
    HeaderColumnNotFound { column: String, header: String },

    /// The identity locator could not be parsed
    #[error("invalid identity locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// Identity extraction failed for a record; the locator does not fit the dataset
    #[error("identity extraction failed at record {position}: {source}")]
    IdentityExtractionFailed {
        position: u64,
        #[source]
        source: Box<DeltaError>,
    },

    /// Old and new fingerprint locations are the same file
    #[error("previous fingerprints file must differ from the new fingerprints file {0}")]
    FingerprintPathConflict(PathBuf),

    /// An explicitly supplied previous fingerprint file could not be opened
    #[error("could not open previous fingerprints file {path}: {source}")]
    FingerprintUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A previous fingerprint file was read but its content is not a fingerprint table
    #[error("could not parse previous fingerprints file {path}: {reason}")]
    FingerprintUnparseable { path: PathBuf, reason: String },

    /// A tabular source had no header row
    #[error("source {0} is empty: expected a header row")]
    MissingHeader(PathBuf),

    /// The source stream could not be decoded into records
    #[error("malformed source: {0}")]
    MalformedSource(String),

    /// The delta sink rejected a record
    #[error("delta sink failure: {0}")]
    Sink(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeltaError {
    /// Wrap a per-record extraction error with the record's 1-based position
    pub fn extraction_failed(position: u64, source: DeltaError) -> Self {
        Self::IdentityExtractionFailed {
            position,
            source: Box::new(source),
        }
    }
}

/// Result type for delta operations.
pub type Result<T> = std::result::Result<T, DeltaError>;
