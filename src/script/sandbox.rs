// src/script/sandbox.rs

//! Construction of the restricted Lua state a save-format script runs in.

use mlua::{Lua, LuaOptions, StdLib, Value};
use tracing::debug;

use crate::errors::ScriptError;

/// Standard libraries available to scripts. No `io`, `os`, `package` or
/// `debug`.
pub fn allowed_libs() -> StdLib {
    StdLib::COROUTINE | StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH
}

/// Base-library globals that would give a script file or module access.
const BLOCKED_GLOBALS: &[&str] = &["dofile", "loadfile", "require"];

/// Create a fresh sandboxed Lua state.
pub fn new_state(memory_limit: Option<usize>) -> Result<Lua, ScriptError> {
    let lua = Lua::new_with(allowed_libs(), LuaOptions::default())
        .map_err(|e| ScriptError::Load(e.to_string()))?;

    let globals = lua.globals();
    for name in BLOCKED_GLOBALS {
        globals
            .set(*name, Value::Nil)
            .map_err(|e| ScriptError::Load(e.to_string()))?;
    }

    if let Some(limit) = memory_limit {
        lua.set_memory_limit(limit)
            .map_err(|e| ScriptError::Load(e.to_string()))?;
        debug!(limit, "script memory limit set");
    }

    check_word_size(&lua)?;
    Ok(lua)
}

/// Compare the runtime's `size_t` width with the host's pointer width.
fn check_word_size(lua: &Lua) -> Result<(), ScriptError> {
    let runtime: usize = lua
        .load("return string.packsize('T')")
        .set_name("=word-size-check")
        .eval()
        .map_err(|e| ScriptError::Load(e.to_string()))?;
    let host = std::mem::size_of::<usize>();
    if runtime != host {
        return Err(ScriptError::ArchitectureMismatch { runtime, host });
    }
    Ok(())
}
