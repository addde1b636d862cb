// src/config/loader.rs

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::error::Category;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::model::{ConfigDocument, ConfigFile, RawConfigFile, RawVersionConfig};
use crate::errors::ConfigError;
use crate::fs::FileSystem;

/// Key that turns a document into a redirect.
pub const USE_INSTEAD_KEY: &str = "useInstead";

/// Parse one config document without following redirects or validating.
///
/// Keys must be unique within the document; JSON itself allows repeats, but a
/// repeated version name (or `useInstead`) is rejected instead of silently
/// keeping the last one.
pub fn parse_document(contents: &str) -> Result<ConfigDocument, ConfigError> {
    let DocumentEntries(entries) = serde_json::from_str(contents).map_err(|e| match e.classify() {
        Category::Data => ConfigError::InvalidConfig("top level must be a JSON object".to_string()),
        _ => ConfigError::InvalidConfig(format!("malformed JSON: {e}")),
    })?;

    let mut seen = HashSet::new();
    for (key, _) in &entries {
        if !seen.insert(key.as_str()) {
            return Err(ConfigError::InvalidConfig(format!("duplicate key \"{key}\"")));
        }
    }

    if let Some((_, target)) = entries.iter().find(|(key, _)| key == USE_INSTEAD_KEY) {
        return match target {
            Value::String(path) if !path.trim().is_empty() => {
                Ok(ConfigDocument::Redirect(PathBuf::from(path)))
            }
            other => Err(ConfigError::InvalidConfig(format!(
                "`{USE_INSTEAD_KEY}` must be a non-empty string, got {other}"
            ))),
        };
    }

    parse_versions(entries).map(ConfigDocument::Terminal)
}

fn parse_versions(entries: Vec<(String, Value)>) -> Result<RawConfigFile, ConfigError> {
    let mut versions = BTreeMap::new();
    for (name, value) in entries {
        let version: RawVersionConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::InvalidConfig(format!("version '{name}': {e}")))?;
        versions.insert(name, version);
    }
    Ok(RawConfigFile { versions })
}

/// Top-level object entries in document order, duplicates included.
struct DocumentEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for DocumentEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DocumentEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(DocumentEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Read and parse the single document at `path`.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<ConfigDocument, ConfigError> {
    let contents = fs.read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&contents)
}

/// Resolve the config at `path` to a validated terminal config.
///
/// `useInstead` targets are joined onto `config_dir`. Every document on the
/// chain is read exactly once; revisiting a path fails with
/// [`ConfigError::RedirectLoop`] before it is read a second time. Nothing is
/// returned unless the whole chain resolves and validates.
pub fn resolve_config(
    fs: &dyn FileSystem,
    config_dir: &Path,
    path: &Path,
) -> Result<ConfigFile, ConfigError> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut current = path.to_path_buf();

    loop {
        visited.insert(normalize(&current));

        match load_from_path(fs, &current)? {
            ConfigDocument::Redirect(target) => {
                let next = config_dir.join(&target);
                if visited.contains(&normalize(&next)) {
                    return Err(ConfigError::RedirectLoop(next));
                }
                debug!(from = ?current, to = ?next, "following useInstead");
                current = next;
            }
            ConfigDocument::Terminal(raw) => {
                let config = ConfigFile::try_from(raw)?;
                info!(
                    path = ?current,
                    versions = config.versions().len(),
                    "config resolved"
                );
                return Ok(config);
            }
        }
    }
}

/// Lexical normalisation used for loop detection: drops `.` components.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
