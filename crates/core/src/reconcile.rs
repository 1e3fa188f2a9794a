//! Snapshot reconciler: one complete run
//!
//! ```text
//! validate paths -> load previous table -> engine pass -> persist outputs
//! ```
//!
//! Outputs sit next to the snapshot (or in an output directory) and are named
//! after its file name:
//! ```text
//! <snapshot>.changes.<ext>       delta records
//! <snapshot>.fingerprints.json   table for the next run
//! <snapshot>.duplicateIds.json   only when duplicates were seen
//! <snapshot>.removedIds.json     only when identities disappeared
//! <snapshot>.summary.json        run counters
//! ```

use std::borrow::Borrow;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::{DeltaEngine, DeltaOutcome, DeltaSink};
use crate::error::{DeltaError, Result};
use crate::identity::IdentityExtractor;
use crate::record::Digestible;
use crate::report::{self, RunSummary};
use crate::store;
use crate::table::FingerprintTable;

/// File locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub delta: PathBuf,
    pub fingerprints: PathBuf,
    /// Previous run's table; `None` on a first run
    pub previous: Option<PathBuf>,
    pub duplicates: PathBuf,
    pub removed: PathBuf,
    pub summary: PathBuf,
}

impl RunPaths {
    /// Derive output locations from the snapshot path
    pub fn for_snapshot(
        snapshot: &Path,
        delta_extension: &str,
        out_dir: Option<&Path>,
        previous: Option<PathBuf>,
    ) -> Self {
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => snapshot.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let name = snapshot.file_name().map(OsString::from).unwrap_or_default();
        let output = |suffix: &str| {
            let mut file = name.clone();
            file.push(suffix);
            dir.join(file)
        };

        Self {
            delta: output(&format!(".changes.{}", delta_extension)),
            fingerprints: output(".fingerprints.json"),
            previous,
            duplicates: output(".duplicateIds.json"),
            removed: output(".removedIds.json"),
            summary: output(".summary.json"),
        }
    }

    fn outputs(&self) -> [&Path; 5] {
        [
            &self.delta,
            &self.fingerprints,
            &self.duplicates,
            &self.removed,
            &self.summary,
        ]
    }

    /// Reject a previous table that any output of this run would overwrite
    pub fn validate(&self) -> Result<()> {
        let Some(previous) = &self.previous else {
            return Ok(());
        };

        let previous_canonical = fs::canonicalize(previous).ok();
        for output in self.outputs() {
            let same = output == previous.as_path()
                || match (&previous_canonical, fs::canonicalize(output).ok()) {
                    (Some(a), Some(b)) => *a == b,
                    _ => false,
                };
            if same {
                return Err(DeltaError::FingerprintPathConflict(output.to_path_buf()));
            }
        }
        Ok(())
    }
}

/// Output options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Indent the fingerprint table (larger file, easier to read)
    pub pretty_fingerprints: bool,
    pub write_summary: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            pretty_fingerprints: false,
            write_summary: true,
        }
    }
}

/// Orchestrates one delta run
pub struct SnapshotReconciler {
    paths: RunPaths,
    options: ReconcileOptions,
}

impl SnapshotReconciler {
    /// Validates the paths before anything is read or created
    pub fn new(paths: RunPaths, options: ReconcileOptions) -> Result<Self> {
        paths.validate()?;
        Ok(Self { paths, options })
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Previous table, or an empty one when none was supplied.
    ///
    /// A supplied but unreadable table is fatal; it never falls back to empty.
    pub fn load_previous(&self) -> Result<FingerprintTable> {
        match &self.paths.previous {
            Some(path) => {
                let table = FingerprintTable::load(path)?;
                info!(path = %path.display(), entries = table.len(), "loaded previous fingerprints");
                Ok(table)
            }
            None => {
                info!("no previous fingerprints file passed, starting from scratch");
                Ok(FingerprintTable::new())
            }
        }
    }

    /// Engine primed with the previous table
    pub fn engine<X, S>(&self, extractor: X, sink: S) -> Result<DeltaEngine<X, S>>
    where
        X: IdentityExtractor,
        X::Record: Digestible,
        S: DeltaSink<X::Record>,
    {
        Ok(DeltaEngine::new(extractor, self.load_previous()?, sink))
    }

    /// Full run over a pull-based record stream
    pub fn run<X, S, I, R>(&self, extractor: X, sink: S, records: I) -> Result<RunSummary>
    where
        X: IdentityExtractor,
        X::Record: Digestible,
        S: DeltaSink<X::Record>,
        I: IntoIterator<Item = Result<R>>,
        R: Borrow<X::Record>,
    {
        let mut engine = self.engine(extractor, sink)?;
        engine.run(records)?;
        self.finalize(engine.finish()?)
    }

    /// Persist side reports, the summary and finally the new table
    pub fn finalize(&self, outcome: DeltaOutcome) -> Result<RunSummary> {
        let DeltaOutcome {
            fingerprints,
            removed,
            duplicates,
            summary,
        } = outcome;

        info!(
            records = summary.records,
            unique = summary.unique,
            delta = summary.delta,
            removed = summary.removed,
            "delta pass complete"
        );

        if duplicates.is_empty() {
            store::remove_stale(&self.paths.duplicates)?;
        } else {
            warn!(
                count = duplicates.len(),
                path = %self.paths.duplicates.display(),
                "duplicate IDs found, used only first occurrences"
            );
            report::write_duplicates(&self.paths.duplicates, &duplicates)?;
        }

        if removed.is_empty() {
            store::remove_stale(&self.paths.removed)?;
        } else {
            info!(
                count = removed.len(),
                path = %self.paths.removed.display(),
                "some entries have disappeared since the last snapshot"
            );
            report::write_removed(&self.paths.removed, &removed)?;
        }

        if self.options.write_summary {
            report::write_summary(&self.paths.summary, &summary)?;
        }

        fingerprints.save(&self.paths.fingerprints, self.options.pretty_fingerprints)?;
        debug!(path = %self.paths.fingerprints.display(), "wrote new fingerprints");

        Ok(summary)
    }
}
