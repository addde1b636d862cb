// src/script/value.rs

//! Values crossing the host/script boundary.

use std::fmt;

use mlua::{FromLua, IntoLua, Lua, Value};

/// The only shapes a value may take when passing between host and script.
///
/// Anything else a script returns (`nil`, functions, non-byte tables) is
/// refused at the boundary rather than guessed at.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl ScriptValue {
    /// Integer view used for widget validation.
    ///
    /// Floats count only when they are integral and in range; text and bytes
    /// never do.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(i) => Some(*i),
            ScriptValue::Float(f)
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::Text(_) => "text",
            ScriptValue::Bytes(_) => "bytes",
        }
    }

    /// Byte content of a value returned as a file image.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ScriptValue::Bytes(bytes) => Some(bytes),
            ScriptValue::Text(text) => Some(text.into_bytes()),
            ScriptValue::Int(_) | ScriptValue::Float(_) => None,
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Int(i) => write!(f, "{i}"),
            ScriptValue::Float(x) => write!(f, "{x}"),
            ScriptValue::Text(s) => write!(f, "{s:?}"),
            ScriptValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl IntoLua for ScriptValue {
    fn into_lua(self, lua: &Lua) -> mlua::Result<Value> {
        match self {
            ScriptValue::Int(i) => Ok(Value::Integer(i)),
            ScriptValue::Float(f) => Ok(Value::Number(f)),
            ScriptValue::Text(s) => lua.create_string(&s).map(Value::String),
            ScriptValue::Bytes(b) => byte_table(lua, &b),
        }
    }
}

impl FromLua for ScriptValue {
    fn from_lua(value: Value, _lua: &Lua) -> mlua::Result<Self> {
        match value {
            Value::Integer(i) => Ok(ScriptValue::Int(i)),
            Value::Number(f) => Ok(ScriptValue::Float(f)),
            Value::String(s) => match std::str::from_utf8(&s.as_bytes()) {
                Ok(text) => Ok(ScriptValue::Text(text.to_string())),
                Err(_) => Ok(ScriptValue::Bytes(s.as_bytes().to_vec())),
            },
            Value::Table(table) => {
                // A byte buffer holds exactly the keys `1..=n`: no holes, no
                // named keys.
                let len = table.raw_len();
                let mut entries = 0usize;
                for pair in table.pairs::<Value, Value>() {
                    pair?;
                    entries += 1;
                }
                if entries != len {
                    return Err(mlua::Error::RuntimeError(format!(
                        "table is not a byte sequence ({entries} entries, sequence length {len})"
                    )));
                }
                let mut bytes = Vec::with_capacity(len);
                for index in 1..=len {
                    bytes.push(byte_from_lua(table.raw_get::<Value>(index)?)?);
                }
                Ok(ScriptValue::Bytes(bytes))
            }
            other => Err(mlua::Error::RuntimeError(format!(
                "cannot convert Lua {} to a script value",
                other.type_name()
            ))),
        }
    }
}

/// Lua sequence `{b1, b2, ...}` of integers, the shape scripts use for file
/// buffers.
pub fn byte_table(lua: &Lua, bytes: &[u8]) -> mlua::Result<Value> {
    let table = lua.create_table_with_capacity(bytes.len(), 0)?;
    for (i, byte) in bytes.iter().enumerate() {
        table.raw_set(i + 1, *byte)?;
    }
    Ok(Value::Table(table))
}

fn byte_from_lua(value: Value) -> mlua::Result<u8> {
    let as_int = match value {
        Value::Integer(i) => Some(i),
        Value::Number(f) if f.fract() == 0.0 => Some(f as i64),
        _ => None,
    };
    as_int
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| {
            mlua::Error::RuntimeError(
                "byte sequences must contain only integers in 0..=255".to_string(),
            )
        })
}
