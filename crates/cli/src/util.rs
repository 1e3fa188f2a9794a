//! Shared utilities for CLI commands

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use snapdelta_core::{RunPaths, RunSummary};
use std::path::Path;
use std::time::Duration;

/// Format a count with thousands separators ("1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Record counter spinner on stderr; hidden when quiet or not on a terminal
pub fn record_spinner(quiet: bool, snapshot: &Path) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {human_pos} records {msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(snapshot.display().to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Print the end-of-run summary
pub fn print_summary(summary: &RunSummary, paths: &RunPaths) {
    println!(
        "{} {} records, {} unique IDs",
        "Processed".bold(),
        format_count(summary.records),
        format_count(summary.unique)
    );
    println!(
        "  {} {}  {} {}  {} {}",
        "new".green(),
        format_count(summary.new),
        "changed".yellow(),
        format_count(summary.changed),
        "unchanged".dimmed(),
        format_count(summary.unchanged)
    );

    if summary.removed > 0 {
        println!(
            "  {} {} {}",
            "removed".red(),
            format_count(summary.removed),
            format!("({})", paths.removed.display()).dimmed()
        );
    }
    if summary.duplicates > 0 {
        println!(
            "  {} {} {}",
            "duplicates".magenta(),
            format_count(summary.duplicates),
            format!("({})", paths.duplicates.display()).dimmed()
        );
    }

    println!(
        "{} {} {}",
        "Delta".bold(),
        format_count(summary.delta),
        format!("-> {}", paths.delta.display()).dimmed()
    );
    println!(
        "{} {}",
        "Fingerprints".bold(),
        paths.fingerprints.display().dimmed()
    );
}
