//! Inspect a persisted fingerprints file

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use snapdelta_core::FingerprintTable;
use std::fs;
use std::path::Path;

use crate::util;

pub fn run(fingerprints: &Path, identity: Option<&str>, list: bool) -> Result<()> {
    let table = FingerprintTable::load(fingerprints)?;

    if let Some(key) = identity {
        match table.get(key) {
            Some(digest) => {
                println!("{}", digest);
                return Ok(());
            }
            None => anyhow::bail!("Identity '{}' not found in {}", key, fingerprints.display()),
        }
    }

    let size = fs::metadata(fingerprints)
        .with_context(|| format!("Failed to stat {}", fingerprints.display()))?
        .len();

    println!("{}", fingerprints.display().bold());
    println!("  {}: {}", "entries".cyan(), util::format_count(table.len() as u64));
    println!("  {}: {}", "size".cyan(), util::format_size(size));

    if list {
        println!();
        for (key, digest) in table.sorted() {
            println!("{}\t{}", digest, key);
        }
    }

    Ok(())
}
