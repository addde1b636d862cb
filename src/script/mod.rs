// src/script/mod.rs

//! Sandboxed script execution.
//!
//! Each version gets its own [`ScriptContext`]: a Lua 5.4 state with a
//! restricted standard library, the host API from [`host_api`], and the
//! save-format script loaded into it.
//!
//! Contract with scripts:
//!
//! - host → script: `edizon.getSaveFileBuffer`, `edizon.getSaveFileString`,
//!   `edizon.getStrArgs`, `edizon.getIntArgs`, `print`;
//! - script → host: `getValueFromSaveFile()`, `setValueInSaveFile(value)`,
//!   `getModifiedSaveFile()`.

pub mod engine;
pub mod host_api;
pub mod sandbox;
pub mod value;

pub use engine::{EngineOptions, ScriptContext, GET_MODIFIED, GET_VALUE, SET_VALUE};
pub use host_api::CallArgs;
pub use value::ScriptValue;
