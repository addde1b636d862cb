// src/errors.rs

//! Crate-wide error types.
//!
//! Each stage of the open sequence has its own enum so callers can match on
//! the failure class; `SaveprobeError` ties them together and adds the
//! per-version context used when a session fails to open.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or following a version-configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("useInstead loop detected at {}", .0.display())]
    RedirectLoop(PathBuf),

    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Failures while locating the save file or script for a version.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("no directories found")]
    NoDirectoriesFound,

    #[error("no files found")]
    NoFilesFound,

    #[error("no file selected among {0} candidates")]
    NoFileSelected(usize),

    #[error("script path not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("version doesn't exist: {0}")]
    UnknownVersion(String),

    #[error("filetype not set")]
    MissingFiletype,

    #[error("cannot list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Failures at the host/script boundary.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to load script: {0}")]
    Load(String),

    #[error("script runtime word size is {runtime} bytes but the host expects {host}")]
    ArchitectureMismatch { runtime: usize, host: usize },

    #[error("script does not define `{0}`")]
    MissingEntryPoint(&'static str),

    #[error("`{entry}` failed: {message}")]
    Runtime { entry: &'static str, message: String },

    #[error("`{entry}` returned an unusable value: {message}")]
    BadReturnValue { entry: &'static str, message: String },

    #[error("cannot read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// A value read from the save file lies outside its widget's domain.
///
/// Never returned as `Err`: it disables one item and is logged once.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Item \"{item}\"{} of type \"{kind}\" has an invalid value of {value}.", category_suffix(.category))]
pub struct ValidationError {
    pub item: String,
    pub category: Option<String>,
    pub kind: &'static str,
    pub value: String,
}

fn category_suffix(category: &Option<String>) -> String {
    match category {
        Some(c) if !c.is_empty() => format!(" in Category \"{c}\""),
        _ => String::new(),
    }
}

/// Failures of the item write path.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("item \"{0}\" holds an invalid value and cannot be edited")]
    Disabled(String),

    #[error("rejected input for item \"{item}\": {reason}")]
    Rejected { item: String, reason: String },

    #[error(transparent)]
    Script(#[from] ScriptError),
}

#[derive(Error, Debug)]
pub enum SaveprobeError {
    #[error("Failed to load config file: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialise version \"{version}\": {source}")]
    VersionInit {
        version: String,
        #[source]
        source: Box<SaveprobeError>,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("unknown item \"{0}\"")]
    UnknownItem(String),

    #[error("no config is open")]
    NoSession,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SaveprobeError {
    /// Wrap an error with the name of the version whose initialisation failed.
    pub fn in_version(self, version: impl Into<String>) -> Self {
        SaveprobeError::VersionInit {
            version: version.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SaveprobeError>;
