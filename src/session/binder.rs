// src/session/binder.rs

//! Reading and writing items through a version's script.

use tracing::debug;

use crate::config::{Item, Widget};
use crate::errors::{CommitError, ScriptError};
use crate::logging::MessageSink;
use crate::script::{CallArgs, ScriptContext, ScriptValue};
use crate::session::validator::{validate, DisplayState};
use crate::types::MessageLevel;

/// A list entry chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Index(usize),
    Name(String),
}

/// New input for an item, as a control would deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Free text typed into an `int` item.
    Text(String),
    /// New state of a `bool` item.
    Toggle(bool),
    /// Selection in a `list` item.
    Choice(Choice),
}

impl UserInput {
    /// Interpret command-line text for `widget`.
    ///
    /// - `int`: the text as typed (numeric checks happen at commit);
    /// - `bool`: `true/false`, `on/off`, `yes/no`, `1/0`;
    /// - `list`: an entry name, or `#<index>`.
    pub fn from_text(widget: &Widget, text: &str) -> Result<Self, String> {
        match widget {
            Widget::Int { .. } => Ok(UserInput::Text(text.to_string())),
            Widget::Bool { .. } => match text.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(UserInput::Toggle(true)),
                "false" | "off" | "no" | "0" => Ok(UserInput::Toggle(false)),
                other => Err(format!("expected on/off, got {other:?}")),
            },
            Widget::List { .. } => {
                let text = text.trim();
                match text.strip_prefix('#') {
                    Some(index) => index
                        .parse::<usize>()
                        .map(|i| UserInput::Choice(Choice::Index(i)))
                        .map_err(|_| format!("invalid list index {text:?}")),
                    None => Ok(UserInput::Choice(Choice::Name(text.to_string()))),
                }
            }
        }
    }
}

/// An item together with how it is currently presented.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundItem<'a> {
    pub item: &'a Item,
    pub display: DisplayState,
}

impl BoundItem<'_> {
    pub fn is_editable(&self) -> bool {
        self.display.is_editable()
    }
}

/// Mediates every item read and write for one version.
#[derive(Debug, Clone, Copy)]
pub struct ItemBinder<'s> {
    context: &'s ScriptContext,
    sink: &'s dyn MessageSink,
}

impl<'s> ItemBinder<'s> {
    pub fn new(context: &'s ScriptContext, sink: &'s dyn MessageSink) -> Self {
        Self { context, sink }
    }

    /// Read `item` through the script and validate it.
    ///
    /// An out-of-domain value is not an error here: the item comes back
    /// disabled and one ERROR message is emitted.
    pub fn bind<'a>(&self, item: &'a Item) -> Result<BoundItem<'a>, ScriptError> {
        let raw = self.read(item)?;
        let display = match validate(item, &raw) {
            Ok(display) => display,
            Err(invalid) => {
                self.sink.emit(MessageLevel::Error, &invalid.to_string());
                DisplayState::Invalid
            }
        };
        Ok(BoundItem { item, display })
    }

    /// Raw value of `item` as returned by the script.
    pub fn read(&self, item: &Item) -> Result<ScriptValue, ScriptError> {
        self.context
            .read_item(CallArgs::new(&item.str_args, &item.int_args))
    }

    /// Write `input` to `bound` and update its display optimistically.
    ///
    /// Input that does not fit the widget is rejected before the script is
    /// called. The value is not read back after writing; the returned state
    /// is the one that was requested.
    pub fn commit(
        &self,
        bound: &mut BoundItem<'_>,
        input: UserInput,
    ) -> Result<DisplayState, CommitError> {
        if !bound.is_editable() {
            return Err(CommitError::Disabled(bound.item.name.clone()));
        }

        let (value, display) = plan_write(bound.item, input)?;
        debug!(item = %bound.item.name, value, "committing item");
        self.context.write_item(
            CallArgs::new(&bound.item.str_args, &bound.item.int_args),
            ScriptValue::Int(value),
        )?;
        bound.display = display.clone();
        Ok(display)
    }
}

/// Turn user input into the value to write and the display it implies.
fn plan_write(item: &Item, input: UserInput) -> Result<(i64, DisplayState), CommitError> {
    let rejected = |reason: String| CommitError::Rejected {
        item: item.name.clone(),
        reason,
    };

    match (&item.widget, input) {
        (Widget::Int { min, max }, UserInput::Text(text)) => {
            let requested = parse_number(&text)
                .ok_or_else(|| rejected(format!("{text:?} is not a number")))?;
            let value = requested.clamp(*min, *max);
            Ok((value, DisplayState::Int { value }))
        }
        (Widget::Bool { on_value, off_value }, UserInput::Toggle(checked)) => {
            let value = if checked { *on_value } else { *off_value };
            Ok((value, DisplayState::Bool { checked }))
        }
        (Widget::List { values, names }, UserInput::Choice(choice)) => {
            let index = match &choice {
                Choice::Index(index) => Some(*index).filter(|i| *i < values.len()),
                Choice::Name(name) => names.iter().position(|n| n == name),
            }
            .ok_or_else(|| rejected(format!("no list entry {choice:?}")))?;
            Ok((
                values[index],
                DisplayState::List {
                    index,
                    name: names[index].clone(),
                },
            ))
        }
        (widget, input) => Err(rejected(format!(
            "{input:?} does not apply to a {} widget",
            widget.kind()
        ))),
    }
}

/// Parse an integer, saturating numerals too large for `i64`.
fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}
