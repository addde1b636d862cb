// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::locate::Picker;
use crate::settings::DEFAULT_SETTINGS_FILE;

/// Command-line arguments for `saveprobe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "saveprobe",
    version,
    about = "Inspect and edit game save files through per-format Lua scripts.",
    long_about = None
)]
pub struct CliArgs {
    /// Config document (JSON) to open. Without it no config is opened.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Settings file (TOML). Missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SAVEPROBE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Override the script directory from the settings file.
    #[arg(long, value_name = "DIR")]
    pub script_dir: Option<PathBuf>,

    /// Override the config directory from the settings file.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Override the save directory from the settings file.
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Candidate to use (0-based, in listed order) when several save files
    /// match a version.
    #[arg(long, value_name = "N")]
    pub pick: Option<usize>,

    /// Script to use when the conventional `<filetype>.<ext>` script is
    /// missing.
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Version to list, edit and export. Defaults to the first version.
    #[arg(long, value_name = "NAME")]
    pub version_name: Option<String>,

    /// Commit a value: `ITEM=VALUE`. May be repeated.
    #[arg(long = "set", value_name = "ITEM=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    /// Write the modified save file here after all commits.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (item, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM=VALUE, got {s:?}"))?;
    let item = item.trim();
    if item.is_empty() {
        return Err(format!("missing item name in {s:?}"));
    }
    Ok((item.to_string(), value.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Non-interactive [`Picker`] answering from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct FlagPicker {
    pub save_index: Option<usize>,
    pub script: Option<PathBuf>,
}

impl FlagPicker {
    pub fn from_args(args: &CliArgs) -> Self {
        Self {
            save_index: args.pick,
            script: args.script.clone(),
        }
    }
}

impl Picker for FlagPicker {
    fn pick_save_file(&mut self, version: &str, candidates: &[PathBuf]) -> Option<PathBuf> {
        let Some(index) = self.save_index else {
            warn!(version, "several save files match; rerun with --pick N");
            for (index, candidate) in candidates.iter().enumerate() {
                warn!(version, index, candidate = %candidate.display(), "save file candidate");
            }
            return None;
        };
        let chosen = candidates.get(index).cloned();
        if chosen.is_none() {
            warn!(version, index, candidates = candidates.len(), "--pick out of range");
        }
        chosen
    }

    fn pick_script(&mut self, _version: &str, _expected: &Path) -> Option<PathBuf> {
        self.script.clone()
    }
}
