//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays free for command output. Filter
//! precedence: `RUST_LOG`, then the configured level, then `info` (`warn`
//! when running quietly).

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::LoggingSettings;

pub fn init(settings: &LoggingSettings, quiet: bool) -> Result<()> {
    let fallback = if quiet { "warn" } else { "info" };
    let level = settings.level.as_deref().unwrap_or(fallback);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    let fmt_layer = if settings.json {
        fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .boxed()
    };

    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}
