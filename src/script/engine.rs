// src/script/engine.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mlua::{FromLua, Function, Lua, Value};
use tracing::{debug, info};

use crate::errors::ScriptError;
use crate::fs::FileSystem;
use crate::logging::MessageSink;
use crate::script::host_api::{self, CallArgs};
use crate::script::sandbox;
use crate::script::value::ScriptValue;

/// Entry points every save-format script must define.
pub const GET_VALUE: &str = "getValueFromSaveFile";
pub const SET_VALUE: &str = "setValueInSaveFile";
pub const GET_MODIFIED: &str = "getModifiedSaveFile";

/// Knobs for creating a context.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub memory_limit: Option<usize>,
}

/// A loaded script bound to one save file.
///
/// The script keeps whatever decoded form of the save file it likes between
/// calls; the host only ever talks to it through the three entry points.
pub struct ScriptContext {
    lua: Lua,
    script_path: PathBuf,
    save_file: PathBuf,
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("script_path", &self.script_path)
            .field("save_file", &self.save_file)
            .finish_non_exhaustive()
    }
}

impl ScriptContext {
    /// Create a sandboxed state, register the host API and run the script
    /// once.
    ///
    /// Entry points are not checked here; a missing one shows up as
    /// [`ScriptError::MissingEntryPoint`] on first use.
    pub fn initialize(
        fs: Arc<dyn FileSystem>,
        sink: Arc<dyn MessageSink>,
        script_path: &Path,
        save_file: &Path,
        options: &EngineOptions,
    ) -> Result<Self, ScriptError> {
        let source = fs
            .read_to_string(script_path)
            .map_err(|source| ScriptError::Io {
                path: script_path.to_path_buf(),
                source,
            })?;

        let lua = sandbox::new_state(options.memory_limit)?;
        host_api::register(&lua, fs, save_file.to_path_buf(), sink)
            .map_err(|e| ScriptError::Load(e.to_string()))?;

        lua.load(source.as_str())
            .set_name(format!("@{}", script_path.display()))
            .exec()
            .map_err(|e| ScriptError::Load(e.to_string()))?;

        info!(script = ?script_path, save_file = ?save_file, "script loaded");
        Ok(Self {
            lua,
            script_path: script_path.to_path_buf(),
            save_file: save_file.to_path_buf(),
        })
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn save_file(&self) -> &Path {
        &self.save_file
    }

    /// Call `getValueFromSaveFile` with `args` installed.
    pub fn read_item(&self, args: CallArgs) -> Result<ScriptValue, ScriptError> {
        let entry = self.entry_point(GET_VALUE)?;
        let _guard = CallArgsGuard::install(&self.lua, args);
        let value: Value = entry.call(()).map_err(|e| runtime(GET_VALUE, e))?;
        self.convert(GET_VALUE, value)
    }

    /// Call `setValueInSaveFile(value)` with `args` installed.
    pub fn write_item(&self, args: CallArgs, value: ScriptValue) -> Result<(), ScriptError> {
        let entry = self.entry_point(SET_VALUE)?;
        let _guard = CallArgsGuard::install(&self.lua, args);
        debug!(%value, "writing value through script");
        entry.call::<()>(value).map_err(|e| runtime(SET_VALUE, e))
    }

    /// Call `getModifiedSaveFile` and return the file image it produces.
    ///
    /// Accepts a Lua string or a sequence of byte-valued integers.
    pub fn export_modified_file(&self) -> Result<Vec<u8>, ScriptError> {
        let entry = self.entry_point(GET_MODIFIED)?;
        let value: Value = entry.call(()).map_err(|e| runtime(GET_MODIFIED, e))?;
        let converted = self.convert(GET_MODIFIED, value)?;
        let kind = converted.type_name();
        converted
            .into_bytes()
            .ok_or_else(|| ScriptError::BadReturnValue {
                entry: GET_MODIFIED,
                message: format!("expected a byte sequence, got {kind}"),
            })
    }

    fn entry_point(&self, name: &'static str) -> Result<Function, ScriptError> {
        self.lua
            .globals()
            .get::<Option<Function>>(name)
            .map_err(|e| runtime(name, e))?
            .ok_or(ScriptError::MissingEntryPoint(name))
    }

    fn convert(&self, entry: &'static str, value: Value) -> Result<ScriptValue, ScriptError> {
        ScriptValue::from_lua(value, &self.lua).map_err(|e| ScriptError::BadReturnValue {
            entry,
            message: e.to_string(),
        })
    }
}

fn runtime(entry: &'static str, error: mlua::Error) -> ScriptError {
    ScriptError::Runtime {
        entry,
        message: error.to_string(),
    }
}

/// Keeps [`CallArgs`] installed for exactly one invocation.
struct CallArgsGuard<'a> {
    lua: &'a Lua,
}

impl<'a> CallArgsGuard<'a> {
    fn install(lua: &'a Lua, args: CallArgs) -> Self {
        lua.set_app_data(args);
        Self { lua }
    }
}

impl Drop for CallArgsGuard<'_> {
    fn drop(&mut self) {
        let _ = self.lua.remove_app_data::<CallArgs>();
    }
}
