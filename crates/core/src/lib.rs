//! Snapdelta Core - fingerprint-based change detection between snapshots
//!
//! This crate provides:
//! - BLAKE3 record digests with unambiguous field framing
//! - Identity extraction (tabular columns, nested record paths)
//! - Single-pass delta engine with a shrinking previous table
//! - Fingerprint table persistence and side reports
//! - CSV and streaming JSON adapters

pub mod adapter;
pub mod engine;
pub mod error;
pub mod hash;
pub mod identity;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod store;
pub mod table;

// Re-exports
pub use engine::{Classification, DeltaEngine, DeltaOutcome, DeltaSink};
pub use error::{DeltaError, Result};
pub use hash::{digest_fields, Digest, FieldHasher};
pub use identity::{ColumnIdentity, ColumnRef, IdentityExtractor, IdentityKey, JsonPath, PathIdentity};
pub use reconcile::{ReconcileOptions, RunPaths, SnapshotReconciler};
pub use record::Digestible;
pub use report::RunSummary;
pub use table::FingerprintTable;
