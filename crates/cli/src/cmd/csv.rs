//! Delta of a CSV snapshot

use anyhow::{Context, Result};
use snapdelta_core::adapter::{CsvDeltaSink, CsvOptions, CsvSource};
use snapdelta_core::{ColumnRef, DeltaEngine, RunPaths, SnapshotReconciler};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputSettings;
use crate::util;

pub fn run(
    snapshot: &Path,
    id_column: &str,
    previous: Option<PathBuf>,
    delimiter: char,
    output: &OutputSettings,
    quiet: bool,
) -> Result<()> {
    let options = CsvOptions {
        delimiter: delimiter_byte(delimiter)?,
    };
    let column: ColumnRef = id_column.parse()?;

    output.ensure_dir()?;
    let paths = RunPaths::for_snapshot(snapshot, "csv", output.dir.as_deref(), previous);
    let reconciler = SnapshotReconciler::new(paths, output.reconcile_options())?;

    let source = CsvSource::open(snapshot, options)
        .with_context(|| format!("Failed to open snapshot {}", snapshot.display()))?;
    let extractor = column.resolve(source.header())?;
    info!(
        snapshot = %snapshot.display(),
        column = %column,
        index = extractor.index(),
        "identity column resolved"
    );

    // Previous table first: a bad file must fail before any output exists
    let previous = reconciler.load_previous()?;

    let delta_path = &reconciler.paths().delta;
    let sink = CsvDeltaSink::create(delta_path, source.header(), options)
        .with_context(|| format!("Failed to create delta file {}", delta_path.display()))?;

    let spinner = util::record_spinner(quiet, snapshot);
    let mut engine = DeltaEngine::new(extractor, previous, sink);
    let processed = engine.run(source.records().inspect(|_| spinner.inc(1)));
    spinner.finish_and_clear();
    processed?;

    let summary = reconciler.finalize(engine.finish()?)?;
    info!("{}", summary);

    if !quiet {
        util::print_summary(&summary, reconciler.paths());
    }
    Ok(())
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}
