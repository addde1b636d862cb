// src/locate/resolve.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::VersionConfig;
use crate::errors::ResolutionError;
use crate::fs::FileSystem;
use crate::locate::discovery::{locate_directories, locate_files};

/// External collaborator that settles choices the pipeline will not make on
/// its own.
///
/// Returning `None` means the user cancelled; the version then fails to
/// initialise.
pub trait Picker {
    /// Choose one save file among several candidates (always more than one).
    fn pick_save_file(&mut self, version: &str, candidates: &[PathBuf]) -> Option<PathBuf>;

    /// Supply a script when `<script_dir>/<filetype>.<ext>` does not exist.
    fn pick_script(&mut self, version: &str, expected: &Path) -> Option<PathBuf>;
}

/// Picker that never chooses anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPicker;

impl Picker for NoPicker {
    fn pick_save_file(&mut self, _version: &str, _candidates: &[PathBuf]) -> Option<PathBuf> {
        None
    }

    fn pick_script(&mut self, _version: &str, _expected: &Path) -> Option<PathBuf> {
        None
    }
}

/// Outcome of discovery before any user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Unique(PathBuf),
    Ambiguous(Vec<PathBuf>),
}

/// Run directory expansion and file matching for one version.
pub fn locate_save_file(
    fs: &dyn FileSystem,
    save_root: &Path,
    version: &VersionConfig,
) -> Result<Located, ResolutionError> {
    let directories = locate_directories(fs, save_root, &version.save_file_paths)?;
    if directories.is_empty() {
        return Err(ResolutionError::NoDirectoriesFound);
    }
    debug!(count = directories.len(), "save directories located");

    let files: BTreeSet<PathBuf> = locate_files(fs, &directories, &version.files)?;
    let mut files: Vec<PathBuf> = files.into_iter().collect();
    match files.len() {
        0 => Err(ResolutionError::NoFilesFound),
        1 => Ok(Located::Unique(files.remove(0))),
        _ => Ok(Located::Ambiguous(files)),
    }
}

/// Resolve exactly one save file for `version_name`, asking `picker` only
/// when discovery yields more than one candidate.
pub fn resolve_save_file(
    fs: &dyn FileSystem,
    save_root: &Path,
    version_name: &str,
    version: &VersionConfig,
    picker: &mut dyn Picker,
) -> Result<PathBuf, ResolutionError> {
    match locate_save_file(fs, save_root, version)? {
        Located::Unique(path) => {
            info!(version = version_name, file = ?path, "save file located");
            Ok(path)
        }
        Located::Ambiguous(candidates) => {
            info!(
                version = version_name,
                candidates = candidates.len(),
                "multiple save files match; asking for a selection"
            );
            match picker.pick_save_file(version_name, &candidates) {
                Some(choice) if candidates.contains(&choice) => Ok(choice),
                _ => Err(ResolutionError::NoFileSelected(candidates.len())),
            }
        }
    }
}
