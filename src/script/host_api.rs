// src/script/host_api.rs

//! Functions the host exposes to scripts.
//!
//! | Lua name                    | Returns                                  |
//! |-----------------------------|------------------------------------------|
//! | `edizon.getSaveFileBuffer()`| save file bytes as `{b1, b2, ...}`       |
//! | `edizon.getSaveFileString()`| save file text (lossy UTF-8)             |
//! | `edizon.getStrArgs()`       | current item's `strArgs` as a sequence   |
//! | `edizon.getIntArgs()`       | current item's `intArgs` as a sequence   |
//! | `print(...)`                | nothing; forwards to the message channel |

use std::path::PathBuf;
use std::sync::Arc;

use mlua::{Lua, Table, Value, Variadic};

use crate::fs::FileSystem;
use crate::logging::MessageSink;
use crate::script::value::byte_table;
use crate::types::MessageLevel;

pub const HOST_TABLE: &str = "edizon";
pub const GET_SAVE_FILE_BUFFER: &str = "getSaveFileBuffer";
pub const GET_SAVE_FILE_STRING: &str = "getSaveFileString";
pub const GET_STR_ARGS: &str = "getStrArgs";
pub const GET_INT_ARGS: &str = "getIntArgs";
pub const PRINT: &str = "print";

/// Addressing data for exactly one entry-point invocation.
///
/// Installed as Lua app data for the duration of a single
/// `getValueFromSaveFile` / `setValueInSaveFile` call and removed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    pub str_args: Vec<String>,
    pub int_args: Vec<i64>,
}

impl CallArgs {
    pub fn new(str_args: &[String], int_args: &[i64]) -> Self {
        Self {
            str_args: str_args.to_vec(),
            int_args: int_args.to_vec(),
        }
    }
}

/// Register the whole host API on `lua`.
pub fn register(
    lua: &Lua,
    fs: Arc<dyn FileSystem>,
    save_file: PathBuf,
    sink: Arc<dyn MessageSink>,
) -> mlua::Result<()> {
    let host = lua.create_table()?;
    register_save_file_accessors(lua, &host, fs, save_file)?;
    register_call_args_accessors(lua, &host)?;
    lua.globals().set(HOST_TABLE, host)?;
    register_print(lua, sink)?;
    Ok(())
}

fn register_save_file_accessors(
    lua: &Lua,
    host: &Table,
    fs: Arc<dyn FileSystem>,
    save_file: PathBuf,
) -> mlua::Result<()> {
    let (buffer_fs, buffer_path) = (Arc::clone(&fs), save_file.clone());
    host.set(
        GET_SAVE_FILE_BUFFER,
        lua.create_function(move |lua, ()| {
            let bytes = buffer_fs
                .read(&buffer_path)
                .map_err(|e| mlua::Error::RuntimeError(format!("{e:#}")))?;
            byte_table(lua, &bytes)
        })?,
    )?;

    host.set(
        GET_SAVE_FILE_STRING,
        lua.create_function(move |_, ()| {
            let bytes = fs
                .read(&save_file)
                .map_err(|e| mlua::Error::RuntimeError(format!("{e:#}")))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })?,
    )?;
    Ok(())
}

fn register_call_args_accessors(lua: &Lua, host: &Table) -> mlua::Result<()> {
    host.set(
        GET_STR_ARGS,
        lua.create_function(|lua, ()| {
            let args = current_call_args(lua, GET_STR_ARGS)?;
            Ok(args.str_args)
        })?,
    )?;
    host.set(
        GET_INT_ARGS,
        lua.create_function(|lua, ()| {
            let args = current_call_args(lua, GET_INT_ARGS)?;
            Ok(args.int_args)
        })?,
    )?;
    Ok(())
}

fn current_call_args(lua: &Lua, accessor: &str) -> mlua::Result<CallArgs> {
    lua.app_data_ref::<CallArgs>()
        .map(|args| CallArgs::clone(&args))
        .ok_or_else(|| {
            mlua::Error::RuntimeError(format!(
                "{HOST_TABLE}.{accessor} is only available while an item is being read or written"
            ))
        })
}

fn register_print(lua: &Lua, sink: Arc<dyn MessageSink>) -> mlua::Result<()> {
    let print = lua.create_function(move |_, args: Variadic<Value>| {
        let message = args
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join("\t");
        sink.emit(MessageLevel::Script, &message);
        Ok(())
    })?;
    lua.globals().set(PRINT, print)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy(),
        other => other.type_name().to_string(),
    }
}
