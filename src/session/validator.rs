// src/session/validator.rs

//! Checking raw script values against an item's widget domain.

use crate::config::{Item, Widget};
use crate::errors::ValidationError;
use crate::script::ScriptValue;

/// Text shown in place of a value that failed validation.
pub const INVALID_SENTINEL: &str = "???";

/// How an item is presented after its value has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Int { value: i64 },
    Bool { checked: bool },
    List { index: usize, name: String },
    /// Value outside the domain: shown as [`INVALID_SENTINEL`], not editable.
    Invalid,
}

impl DisplayState {
    pub fn is_editable(&self) -> bool {
        !matches!(self, DisplayState::Invalid)
    }

    pub fn display_text(&self) -> String {
        match self {
            DisplayState::Int { value } => value.to_string(),
            DisplayState::Bool { checked: true } => "[x]".to_string(),
            DisplayState::Bool { checked: false } => "[ ]".to_string(),
            DisplayState::List { name, .. } => name.clone(),
            DisplayState::Invalid => INVALID_SENTINEL.to_string(),
        }
    }
}

/// Decide whether `raw` lies in `item`'s domain and how to present it.
///
/// Nothing is coerced: a value outside the domain, or one that is not an
/// integer at all, is reported as a [`ValidationError`].
pub fn validate(item: &Item, raw: &ScriptValue) -> Result<DisplayState, ValidationError> {
    let invalid = || ValidationError {
        item: item.name.clone(),
        category: item.category.clone(),
        kind: item.widget.kind(),
        value: raw.to_string(),
    };

    let value = raw.as_integer().ok_or_else(invalid)?;

    match &item.widget {
        Widget::Int { min, max } => {
            if (*min..=*max).contains(&value) {
                Ok(DisplayState::Int { value })
            } else {
                Err(invalid())
            }
        }
        Widget::Bool { on_value, off_value } => {
            if value == *on_value || value == *off_value {
                Ok(DisplayState::Bool {
                    checked: value == *on_value,
                })
            } else {
                Err(invalid())
            }
        }
        Widget::List { values, names } => values
            .iter()
            .position(|v| *v == value)
            .and_then(|index| {
                names.get(index).map(|name| DisplayState::List {
                    index,
                    name: name.clone(),
                })
            })
            .ok_or_else(invalid),
    }
}
