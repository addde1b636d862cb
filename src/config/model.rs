// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;

/// One parsed config document, before validation.
///
/// A document either defers entirely to another one:
///
/// ```json
/// { "useInstead": "010012300ABCD000.json" }
/// ```
///
/// or maps version names to their configuration:
///
/// ```json
/// { "1.0.0": { "filetype": "kv", "saveFilePaths": ["save\\d+"],
///              "files": "data\\.bin$", "items": [ ... ] } }
/// ```
#[derive(Debug, Clone)]
pub enum ConfigDocument {
    Redirect(PathBuf),
    Terminal(RawConfigFile),
}

/// Terminal config as read from JSON. Validate it with
/// `ConfigFile::try_from` before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawConfigFile {
    pub versions: BTreeMap<String, RawVersionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersionConfig {
    /// Selects the script: `<script_dir>/<filetype>.<ext>`.
    #[serde(default)]
    pub filetype: Option<String>,

    /// One regex per directory level below the save root.
    #[serde(default)]
    pub save_file_paths: Vec<String>,

    /// Regex matched against the full path of each candidate file.
    pub files: String,

    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub str_args: Vec<String>,

    #[serde(default)]
    pub int_args: Vec<i64>,

    pub widget: RawWidget,
}

/// Widget exactly as written in JSON: a `type` tag plus every field any
/// widget kind might use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWidget {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub min_value: Option<i64>,
    #[serde(default)]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub on_value: Option<i64>,
    #[serde(default)]
    pub off_value: Option<i64>,
    #[serde(default)]
    pub list_item_values: Option<Vec<i64>>,
    #[serde(default)]
    pub list_item_names: Option<Vec<String>>,
}

/// Validated configuration: every version's regexes compiled and every
/// widget checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    versions: BTreeMap<String, VersionConfig>,
}

impl ConfigFile {
    /// Internal constructor used after validation.
    pub(crate) fn new_unchecked(versions: BTreeMap<String, VersionConfig>) -> Self {
        Self { versions }
    }

    pub fn versions(&self) -> &BTreeMap<String, VersionConfig> {
        &self.versions
    }

    pub fn version(&self, name: &str) -> Option<&VersionConfig> {
        self.versions.get(name)
    }

    pub fn into_versions(self) -> BTreeMap<String, VersionConfig> {
        self.versions
    }
}

#[derive(Debug, Clone)]
pub struct VersionConfig {
    pub filetype: Option<String>,
    pub save_file_paths: Vec<Regex>,
    pub files: Regex,
    pub items: Vec<Item>,
}

/// One editable field. `str_args`/`int_args` are passed to the script
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub category: Option<String>,
    pub str_args: Vec<String>,
    pub int_args: Vec<i64>,
    pub widget: Widget,
}

/// Value domain and edit semantics of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Int { min: i64, max: i64 },
    Bool { on_value: i64, off_value: i64 },
    List { values: Vec<i64>, names: Vec<String> },
}

impl Widget {
    /// The config-file spelling of this widget kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Int { .. } => "int",
            Widget::Bool { .. } => "bool",
            Widget::List { .. } => "list",
        }
    }
}
