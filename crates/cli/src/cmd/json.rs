//! Delta of a JSON snapshot

use anyhow::{Context, Result};
use snapdelta_core::adapter::{self, EntriesPath, JsonDeltaSink};
use snapdelta_core::{DeltaEngine, PathIdentity, RunPaths, SnapshotReconciler};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputSettings;
use crate::util;

pub fn run(
    snapshot: &Path,
    entries_path: &str,
    id_path: &str,
    previous: Option<PathBuf>,
    output: &OutputSettings,
    quiet: bool,
) -> Result<()> {
    let entries = EntriesPath::parse(entries_path)?;
    let extractor: PathIdentity = id_path.parse()?;
    info!(
        snapshot = %snapshot.display(),
        entries = %entries,
        identity = %extractor.path(),
        "starting json delta"
    );

    output.ensure_dir()?;
    let paths = RunPaths::for_snapshot(snapshot, "json", output.dir.as_deref(), previous);
    let reconciler = SnapshotReconciler::new(paths, output.reconcile_options())?;

    let source = File::open(snapshot)
        .with_context(|| format!("Failed to open snapshot {}", snapshot.display()))?;

    // Previous table first: a bad file must fail before any output exists
    let previous = reconciler.load_previous()?;

    let delta_path = &reconciler.paths().delta;
    let sink = JsonDeltaSink::create(delta_path, &entries)
        .with_context(|| format!("Failed to create delta file {}", delta_path.display()))?;

    let spinner = util::record_spinner(quiet, snapshot);
    let mut engine = DeltaEngine::new(extractor, previous, sink);
    let streamed = adapter::for_each_record(source, &entries, |record| {
        spinner.inc(1);
        engine.process(&record).map(drop)
    });
    spinner.finish_and_clear();
    let count = streamed.with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;

    if count == 0 {
        info!(entries = %entries, "no records found at entries path");
    }

    let summary = reconciler.finalize(engine.finish()?)?;
    info!("{}", summary);

    if !quiet {
        util::print_summary(&summary, reconciler.paths());
    }
    Ok(())
}
