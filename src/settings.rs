// src/settings.rs

//! Workspace settings from `Saveprobe.toml`.
//!
//! ```toml
//! script_dir = "script"
//! config_dir = "config"
//! save_dir = "save"
//! script_extension = "lua"
//! script_memory_limit_mb = 64
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{Result, SaveprobeError};
use crate::fs::FileSystem;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "Saveprobe.toml";

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where `<filetype>.<script_extension>` scripts are looked up.
    pub script_dir: PathBuf,

    /// Base directory for `useInstead` targets.
    pub config_dir: PathBuf,

    /// Root of the save-file search.
    pub save_dir: PathBuf,

    pub script_extension: String,

    /// Upper bound on memory a single script context may allocate.
    pub script_memory_limit_mb: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            script_dir: PathBuf::from("script"),
            config_dir: PathBuf::from("config"),
            save_dir: PathBuf::from("save"),
            script_extension: "lua".to_string(),
            script_memory_limit_mb: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if it does not
    /// exist.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.is_file(path) {
            debug!(?path, "no settings file; using defaults");
            return Ok(Self::default());
        }
        let contents = fs.read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        info!(?path, "loaded settings");
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.script_extension.trim().is_empty() {
            return Err(SaveprobeError::Settings(
                "script_extension must not be empty".to_string(),
            ));
        }
        if let Some(mb) = self.script_memory_limit_mb {
            if mb == 0 {
                return Err(SaveprobeError::Settings(
                    "script_memory_limit_mb must be >= 1 (got 0)".to_string(),
                ));
            }
            if mb.checked_mul(BYTES_PER_MB).is_none() {
                return Err(SaveprobeError::Settings(format!(
                    "script_memory_limit_mb is too large (got {mb})"
                )));
            }
        }
        Ok(())
    }

    /// Conventional script location for a filetype.
    pub fn script_path_for(&self, filetype: &str) -> PathBuf {
        self.script_dir
            .join(format!("{filetype}.{}", self.script_extension))
    }

    /// Memory limit in bytes. Saturates for values that `load` would have
    /// rejected.
    pub fn script_memory_limit_bytes(&self) -> Option<usize> {
        self.script_memory_limit_mb
            .map(|mb| mb.saturating_mul(BYTES_PER_MB))
    }

    /// Create the script, config and save directories if they are missing.
    pub fn ensure_workspace(&self, fs: &dyn FileSystem) -> Result<()> {
        for dir in [&self.script_dir, &self.config_dir, &self.save_dir] {
            if !fs.is_dir(dir) {
                fs.create_dir_all(dir)?;
                debug!(?dir, "created workspace directory");
            }
        }
        Ok(())
    }
}
