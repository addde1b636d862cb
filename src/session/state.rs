// src/session/state.rs

//! Session lifecycle: open every version of a config or none of them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{resolve_config, Item, VersionConfig};
use crate::errors::{ConfigError, ResolutionError, Result, SaveprobeError, ScriptError};
use crate::fs::FileSystem;
use crate::locate::{resolve_save_file, Picker};
use crate::logging::MessageSink;
use crate::script::{EngineOptions, ScriptContext};
use crate::session::binder::{BoundItem, ItemBinder, UserInput};
use crate::session::validator::DisplayState;
use crate::settings::Settings;
use crate::types::MessageLevel;

/// Category name listed for items that declare none.
pub const NO_CATEGORY: &str = "No Category";

/// Everything a single version owns once it is open.
#[derive(Debug)]
pub struct VersionBinding {
    pub config: VersionConfig,
    pub save_file: PathBuf,
    pub script_path: PathBuf,
    pub context: ScriptContext,
}

#[derive(Debug)]
struct OpenSession {
    config_path: PathBuf,
    versions: BTreeMap<String, VersionBinding>,
    current: String,
}

/// The editor's state across all versions of one config.
///
/// Either every version in the config is bound to a save file and a script,
/// or the session is closed; a failed open never leaves partial state behind.
#[derive(Debug)]
pub struct Session {
    fs: Arc<dyn FileSystem>,
    sink: Arc<dyn MessageSink>,
    settings: Settings,
    open: Option<OpenSession>,
}

impl Session {
    pub fn new(fs: Arc<dyn FileSystem>, sink: Arc<dyn MessageSink>, settings: Settings) -> Self {
        Self {
            fs,
            sink,
            settings,
            open: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.open.as_ref().map(|open| open.config_path.as_path())
    }

    /// Open `config_path`, closing whatever was open before.
    ///
    /// Versions are initialised in name order; the first failure is reported
    /// as FATAL and aborts the whole open.
    pub fn open(&mut self, config_path: &Path, picker: &mut dyn Picker) -> Result<()> {
        self.close();

        match self.open_all(config_path, picker) {
            Ok(open) => {
                info!(
                    config = ?config_path,
                    versions = open.versions.len(),
                    "session opened"
                );
                self.open = Some(open);
                Ok(())
            }
            Err(err) => {
                self.sink.emit(MessageLevel::Fatal, &err.to_string());
                Err(err)
            }
        }
    }

    fn open_all(&self, config_path: &Path, picker: &mut dyn Picker) -> Result<OpenSession> {
        let config = resolve_config(self.fs.as_ref(), &self.settings.config_dir, config_path)?;

        let mut versions = BTreeMap::new();
        for (name, version) in config.into_versions() {
            let binding = self
                .init_version(&name, version, picker)
                .map_err(|e| e.in_version(&name))?;
            versions.insert(name, binding);
        }

        let current = versions
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| ConfigError::InvalidConfig("config has no versions".to_string()))?;

        Ok(OpenSession {
            config_path: config_path.to_path_buf(),
            versions,
            current,
        })
    }

    fn init_version(
        &self,
        name: &str,
        config: VersionConfig,
        picker: &mut dyn Picker,
    ) -> Result<VersionBinding> {
        let filetype = config
            .filetype
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or(ResolutionError::MissingFiletype)?
            .to_string();

        let save_file = resolve_save_file(
            self.fs.as_ref(),
            &self.settings.save_dir,
            name,
            &config,
            picker,
        )?;

        let script_path = self.resolve_script(name, &filetype, picker)?;

        let options = EngineOptions {
            memory_limit: self.settings.script_memory_limit_bytes(),
        };
        let context = ScriptContext::initialize(
            Arc::clone(&self.fs),
            Arc::clone(&self.sink),
            &script_path,
            &save_file,
            &options,
        )?;

        Ok(VersionBinding {
            config,
            save_file,
            script_path,
            context,
        })
    }

    fn resolve_script(
        &self,
        version: &str,
        filetype: &str,
        picker: &mut dyn Picker,
    ) -> Result<PathBuf> {
        let expected = self.settings.script_path_for(filetype);
        if self.fs.is_file(&expected) {
            return Ok(expected);
        }

        warn!(version, expected = ?expected, "script not found");
        self.sink.emit(
            MessageLevel::Warning,
            &format!(
                "{} cannot be found. Choose a script yourself.",
                expected.display()
            ),
        );

        match picker.pick_script(version, &expected) {
            Some(chosen) if self.fs.is_file(&chosen) => Ok(chosen),
            _ => Err(ResolutionError::ScriptNotFound(expected).into()),
        }
    }

    /// Drop every binding, config and path at once.
    pub fn close(&mut self) {
        if let Some(open) = self.open.take() {
            info!(config = ?open.config_path, "session closed");
        }
    }

    fn open_session(&self) -> Result<&OpenSession> {
        self.open.as_ref().ok_or(SaveprobeError::NoSession)
    }

    /// Version names in initialisation order.
    pub fn versions(&self) -> Vec<&str> {
        self.open
            .as_ref()
            .map(|open| open.versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn current_version(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.current.as_str())
    }

    pub fn select_version(&mut self, name: &str) -> Result<()> {
        let open = self.open.as_mut().ok_or(SaveprobeError::NoSession)?;
        if !open.versions.contains_key(name) {
            return Err(ResolutionError::UnknownVersion(name.to_string()).into());
        }
        open.current = name.to_string();
        Ok(())
    }

    pub fn binding(&self, version: &str) -> Result<&VersionBinding> {
        self.open_session()?
            .versions
            .get(version)
            .ok_or_else(|| ResolutionError::UnknownVersion(version.to_string()).into())
    }

    /// Categories of `version`: [`NO_CATEGORY`] first when any item lacks
    /// one, then each declared category once, in declaration order.
    pub fn categories(&self, version: &str) -> Result<Vec<String>> {
        let items = &self.binding(version)?.config.items;
        let mut categories = Vec::new();
        if items.iter().any(|item| item.category.is_none()) {
            categories.push(NO_CATEGORY.to_string());
        }
        for category in items.iter().filter_map(|item| item.category.as_ref()) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        Ok(categories)
    }

    /// Items of `version` listed under `category`.
    pub fn items_in(&self, version: &str, category: &str) -> Result<Vec<&Item>> {
        let items = &self.binding(version)?.config.items;
        Ok(items
            .iter()
            .filter(|item| match &item.category {
                Some(c) => c == category,
                None => category == NO_CATEGORY,
            })
            .collect())
    }

    pub fn binder(&self, version: &str) -> Result<ItemBinder<'_>> {
        let binding = self.binding(version)?;
        Ok(ItemBinder::new(&binding.context, self.sink.as_ref()))
    }

    /// Bind every item of `version`. Script failures are reported per item.
    pub fn bind_all(
        &self,
        version: &str,
    ) -> Result<Vec<(&Item, std::result::Result<BoundItem<'_>, ScriptError>)>> {
        let binding = self.binding(version)?;
        let binder = ItemBinder::new(&binding.context, self.sink.as_ref());
        Ok(binding
            .config
            .items
            .iter()
            .map(|item| (item, binder.bind(item)))
            .collect())
    }

    /// Read `item_name` and commit `input` to it.
    pub fn commit(&self, version: &str, item_name: &str, input: UserInput) -> Result<DisplayState> {
        let binding = self.binding(version)?;
        let item = find_item(&binding.config, item_name)?;
        let binder = ItemBinder::new(&binding.context, self.sink.as_ref());
        let mut bound = binder.bind(item)?;
        Ok(binder.commit(&mut bound, input)?)
    }

    /// Ask `version`'s script for the modified file and write it to
    /// `destination`. Returns the number of bytes written.
    pub fn export(&self, version: &str, destination: &Path) -> Result<usize> {
        let binding = self.binding(version)?;
        let bytes = binding.context.export_modified_file()?;
        self.fs.write(destination, &bytes)?;
        info!(version, destination = ?destination, bytes = bytes.len(), "exported save file");
        Ok(bytes.len())
    }
}

pub fn find_item<'a>(config: &'a VersionConfig, name: &str) -> Result<&'a Item> {
    config
        .items
        .iter()
        .find(|item| item.name == name)
        .ok_or_else(|| SaveprobeError::UnknownItem(name.to_string()))
}
