// src/locate/discovery.rs

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use crate::errors::ResolutionError;
use crate::fs::{slash_path, FileSystem};

/// Expand `patterns` level by level below `root`.
///
/// Level `n` keeps the subdirectories whose name matches `patterns[n]`; only
/// directories matched by the last pattern are returned. With no patterns the
/// result is `{root}`. A missing root matches nothing.
///
/// The walk uses an explicit worklist of `(directory, depth)` pairs, so the
/// depth of the tree never grows the stack, and it stops at
/// `patterns.len()` levels whatever the filesystem looks like.
pub fn locate_directories(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &[Regex],
) -> Result<BTreeSet<PathBuf>, ResolutionError> {
    let mut found = BTreeSet::new();
    if !fs.is_dir(root) {
        debug!(?root, "save root is not a directory");
        return Ok(found);
    }
    if patterns.is_empty() {
        found.insert(root.to_path_buf());
        return Ok(found);
    }

    let mut worklist: VecDeque<(PathBuf, usize)> = VecDeque::new();
    worklist.push_back((root.to_path_buf(), 0));

    while let Some((dir, depth)) = worklist.pop_front() {
        let pattern = &patterns[depth];
        for child in list(fs, &dir)? {
            if !fs.is_dir(&child) || !name_matches(&child, pattern) {
                continue;
            }
            trace!(dir = ?child, depth, "directory matched");
            if depth + 1 == patterns.len() {
                found.insert(child);
            } else {
                worklist.push_back((child, depth + 1));
            }
        }
    }

    Ok(found)
}

/// Collect every file directly inside `directories` whose full path matches
/// `pattern`.
pub fn locate_files<'a, I>(
    fs: &dyn FileSystem,
    directories: I,
    pattern: &Regex,
) -> Result<BTreeSet<PathBuf>, ResolutionError>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut files = BTreeSet::new();
    for dir in directories {
        for entry in list(fs, dir)? {
            if fs.is_file(&entry) && pattern.is_match(&slash_path(&entry)) {
                files.insert(entry);
            }
        }
    }
    Ok(files)
}

fn name_matches(path: &Path, pattern: &Regex) -> bool {
    path.file_name()
        .map(|name| pattern.is_match(&name.to_string_lossy()))
        .unwrap_or(false)
}

fn list(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>, ResolutionError> {
    fs.read_dir(dir).map_err(|source| ResolutionError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
