use std::path::{Path, PathBuf};
use std::sync::Arc;

use saveprobe::fs::mock::MockFileSystem;
use saveprobe::session::Session;
use saveprobe::settings::Settings;

use crate::sink::RecordingSink;

/// In-memory workspace laid out like the default settings:
/// `config/`, `script/` and `save/` below the mock root.
#[derive(Debug, Clone)]
pub struct MockWorkspace {
    pub fs: MockFileSystem,
    pub settings: Settings,
    pub sink: RecordingSink,
}

impl MockWorkspace {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        let settings = Settings::default();
        fs.add_dir(&settings.config_dir);
        fs.add_dir(&settings.script_dir);
        fs.add_dir(&settings.save_dir);
        Self {
            fs,
            settings,
            sink: RecordingSink::new(),
        }
    }

    /// Add `config/<name>` and return its path.
    pub fn add_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.settings.config_dir.join(name);
        self.fs.add_file(&path, contents);
        path
    }

    /// Add `script/<filetype>.lua` and return its path.
    pub fn add_script(&self, filetype: &str, source: &str) -> PathBuf {
        let path = self.settings.script_path_for(filetype);
        self.fs.add_file(&path, source);
        path
    }

    /// Add a file below `save/` and return its full path.
    pub fn add_save(&self, relative: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> PathBuf {
        let path = self.settings.save_dir.join(relative);
        self.fs.add_file(&path, contents);
        path
    }

    pub fn session(&self) -> Session {
        Session::new(
            Arc::new(self.fs.clone()),
            Arc::new(self.sink.clone()),
            self.settings.clone(),
        )
    }
}

impl Default for MockWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
