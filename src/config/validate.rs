// src/config/validate.rs

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::model::{
    ConfigFile, Item, RawConfigFile, RawItem, RawVersionConfig, RawWidget, VersionConfig, Widget,
};
use crate::errors::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConfigError;

    fn try_from(raw: RawConfigFile) -> Result<Self> {
        ensure_has_versions(&raw)?;

        let mut versions = BTreeMap::new();
        for (name, version) in raw.versions {
            let checked = validate_version(&name, version)?;
            versions.insert(name, checked);
        }
        Ok(ConfigFile::new_unchecked(versions))
    }
}

fn ensure_has_versions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.versions.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "config must contain at least one version".to_string(),
        ));
    }
    Ok(())
}

fn validate_version(name: &str, raw: RawVersionConfig) -> Result<VersionConfig> {
    let save_file_paths = raw
        .save_file_paths
        .iter()
        .enumerate()
        .map(|(depth, pattern)| {
            compile(pattern, || format!("version '{name}': saveFilePaths[{depth}]"))
        })
        .collect::<Result<Vec<_>>>()?;

    let files = compile(&raw.files, || format!("version '{name}': files"))?;

    let items = raw
        .items
        .into_iter()
        .map(|item| validate_item(name, item))
        .collect::<Result<Vec<_>>>()?;

    Ok(VersionConfig {
        filetype: raw.filetype,
        save_file_paths,
        files,
        items,
    })
}

fn compile(pattern: &str, location: impl FnOnce() -> String) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ConfigError::InvalidConfig(format!("{}: invalid regex {pattern:?}: {e}", location()))
    })
}

fn validate_item(version: &str, raw: RawItem) -> Result<Item> {
    let widget = validate_widget(&raw.widget).map_err(|reason| {
        ConfigError::InvalidConfig(format!(
            "version '{version}', item '{}': {reason}",
            raw.name
        ))
    })?;

    Ok(Item {
        name: raw.name,
        category: raw.category,
        str_args: raw.str_args,
        int_args: raw.int_args,
        widget,
    })
}

fn validate_widget(raw: &RawWidget) -> std::result::Result<Widget, String> {
    match raw.kind.trim().to_lowercase().as_str() {
        "int" => {
            let min = require(raw.min_value, "minValue")?;
            let max = require(raw.max_value, "maxValue")?;
            if min > max {
                return Err(format!("minValue {min} is greater than maxValue {max}"));
            }
            Ok(Widget::Int { min, max })
        }
        "bool" => Ok(Widget::Bool {
            on_value: require(raw.on_value, "onValue")?,
            off_value: require(raw.off_value, "offValue")?,
        }),
        "list" => {
            let values = require(raw.list_item_values.clone(), "listItemValues")?;
            let names = require(raw.list_item_names.clone(), "listItemNames")?;
            if values.len() != names.len() {
                return Err(format!(
                    "listItemValues has {} entries but listItemNames has {}",
                    values.len(),
                    names.len()
                ));
            }
            Ok(Widget::List { values, names })
        }
        other => Err(format!(
            "unknown widget type \"{other}\" (expected \"int\", \"bool\" or \"list\")"
        )),
    }
}

fn require<T>(value: Option<T>, field: &str) -> std::result::Result<T, String> {
    value.ok_or_else(|| format!("widget is missing `{field}`"))
}
