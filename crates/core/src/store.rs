//! Crash-safe file output

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DeltaError, Result};

/// Atomic write helper
///
/// Streams content into a temporary file next to `target`, fsyncs it, then
/// renames it over the target. Readers see either the old file or the
/// complete new one.
pub fn atomic_write<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write(&mut writer)?;
    writer.flush()?;

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| DeltaError::Io(e.error))?;

    debug!(path = %target.display(), "persisted");
    Ok(())
}

/// Serialize `value` as JSON into `target` atomically
pub fn write_json<T: serde::Serialize + ?Sized>(target: &Path, value: &T, pretty: bool) -> Result<()> {
    atomic_write(target, |w| {
        if pretty {
            serde_json::to_writer_pretty(&mut *w, value)?;
        } else {
            serde_json::to_writer(&mut *w, value)?;
        }
        w.write_all(b"\n")?;
        Ok(())
    })
}

/// Remove a file left over from an earlier run; a missing file is fine
pub fn remove_stale(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale report");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
