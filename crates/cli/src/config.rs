//! Settings file handling
//!
//! ```toml
//! [logging]
//! level = "info"        # level or filter directive
//! json = false
//!
//! [output]
//! dir = "/var/feeds/out"
//! pretty_fingerprints = false
//! write_summary = true
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use snapdelta_core::ReconcileOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Level or `EnvFilter` directive; `RUST_LOG` still wins
    pub level: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Output directory; next to the snapshot when unset
    pub dir: Option<PathBuf>,
    pub pretty_fingerprints: bool,
    pub write_summary: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        let defaults = ReconcileOptions::default();
        Self {
            dir: None,
            pretty_fingerprints: defaults.pretty_fingerprints,
            write_summary: defaults.write_summary,
        }
    }
}

impl OutputSettings {
    /// Copy with the directory replaced when a flag supplied one
    pub fn with_dir(&self, dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.or_else(|| self.dir.clone()),
            ..self.clone()
        }
    }

    /// Create the output directory (and parents) when one is configured
    pub fn ensure_dir(&self) -> Result<()> {
        if let Some(dir) = &self.dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            pretty_fingerprints: self.pretty_fingerprints,
            write_summary: self.write_summary,
        }
    }
}

impl Settings {
    /// Load a TOML settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// File settings (if any) with command-line overrides, validated
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(level) = &args.log_level {
            settings.logging.level = Some(level.clone());
        }
        if args.log_json {
            settings.logging.json = true;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.logging.level {
            EnvFilter::try_new(level)
                .with_context(|| format!("Invalid log level '{}'", level))?;
        }

        if let Some(dir) = &self.output.dir {
            if dir.as_os_str().is_empty() {
                anyhow::bail!("Output directory must not be empty");
            }
            if dir.exists() && !dir.is_dir() {
                anyhow::bail!("Output path {} is not a directory", dir.display());
            }
        }

        Ok(())
    }
}
