//! Fingerprint-based delta engine
//!
//! One engine instance owns all state of one run: the previous table (which
//! shrinks), the current table (which grows), the duplicate log and the
//! counters. Records are classified one at a time and qualifying records go
//! straight to the sink, so memory is bounded by the two tables rather than
//! by the snapshot.

use std::borrow::Borrow;

use tracing::trace;

use crate::error::{DeltaError, Result};
use crate::identity::{IdentityExtractor, IdentityKey};
use crate::record::Digestible;
use crate::report::RunSummary;
use crate::table::FingerprintTable;

/// Outcome of classifying one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Identity absent from the previous table
    New,
    /// Identity present with a different digest
    Changed,
    /// Identity present with the same digest
    Unchanged,
    /// Identity already seen earlier in this snapshot; not evaluated
    Duplicate,
}

impl Classification {
    /// Whether the record belongs in the delta
    pub fn is_delta(self) -> bool {
        matches!(self, Self::New | Self::Changed)
    }
}

/// Receives delta records in source order.
///
/// # Contract
/// - `emit` is called once per new or changed record, immediately after it
///   is classified.
/// - `finish` is called once after the last record; implementations flush
///   here.
pub trait DeltaSink<R: ?Sized> {
    fn emit(&mut self, record: &R) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R: ?Sized, S: DeltaSink<R> + ?Sized> DeltaSink<R> for &mut S {
    fn emit(&mut self, record: &R) -> Result<()> {
        (**self).emit(record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Collecting sink for tests and diagnostics
impl<R: Clone> DeltaSink<R> for Vec<R> {
    fn emit(&mut self, record: &R) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Everything a finished run hands to the reconciler
#[derive(Debug, Clone)]
pub struct DeltaOutcome {
    /// Current table, the next run's previous table
    pub fingerprints: FingerprintTable,
    /// Previous entries no current record matched
    pub removed: FingerprintTable,
    /// Identities seen more than once, one entry per extra occurrence
    pub duplicates: Vec<IdentityKey>,
    pub summary: RunSummary,
}

/// Single-pass delta engine
pub struct DeltaEngine<X, S> {
    extractor: X,
    sink: S,
    previous: FingerprintTable,
    current: FingerprintTable,
    duplicates: Vec<IdentityKey>,
    summary: RunSummary,
}

impl<X, S> DeltaEngine<X, S>
where
    X: IdentityExtractor,
    X::Record: Digestible,
    S: DeltaSink<X::Record>,
{
    /// Start a run against the previous table (empty on a first run)
    pub fn new(extractor: X, previous: FingerprintTable, sink: S) -> Self {
        Self {
            extractor,
            sink,
            previous,
            current: FingerprintTable::new(),
            duplicates: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    /// Classify one record and emit it if it is new or changed.
    ///
    /// An identity extraction failure is fatal for the run and carries the
    /// record's 1-based position.
    pub fn process(&mut self, record: &X::Record) -> Result<Classification> {
        self.summary.records += 1;
        let position = self.summary.records;

        let key = self
            .extractor
            .extract(record)
            .map_err(|e| DeltaError::extraction_failed(position, e))?;

        // The current table holds exactly the identities seen so far
        if self.current.contains(&key) {
            trace!(position, identity = %key, "duplicate identity");
            self.duplicates.push(key);
            self.summary.duplicates += 1;
            return Ok(Classification::Duplicate);
        }

        let digest = record.digest();

        // Lookup-then-remove: whatever survives the pass was deleted upstream
        let class = match self.previous.remove(&key) {
            None => Classification::New,
            Some(old) if old != digest => Classification::Changed,
            Some(_) => Classification::Unchanged,
        };
        trace!(position, identity = %key, ?class, "classified");

        self.current.insert(key, digest);

        match class {
            Classification::New => self.summary.new += 1,
            Classification::Changed => self.summary.changed += 1,
            _ => self.summary.unchanged += 1,
        }

        if class.is_delta() {
            self.sink.emit(record)?;
            self.summary.delta += 1;
        }

        Ok(class)
    }

    /// Drive the engine over a record stream, stopping at the first error
    pub fn run<I, R>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<R>>,
        R: Borrow<X::Record>,
    {
        for record in records {
            self.process(record?.borrow())?;
        }
        Ok(())
    }

    /// Counters so far
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Flush the sink and turn the remaining state into the run outcome
    pub fn finish(mut self) -> Result<DeltaOutcome> {
        self.sink.finish()?;

        self.summary.unique = self.current.len() as u64;
        self.summary.removed = self.previous.len() as u64;

        Ok(DeltaOutcome {
            fingerprints: self.current,
            removed: self.previous,
            duplicates: self.duplicates,
            summary: self.summary,
        })
    }
}
