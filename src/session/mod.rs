// src/session/mod.rs

//! Per-session state and item access.
//!
//! - `state`: opening a config across all versions, atomically closing it,
//!   and export.
//! - `binder`: reading and committing items through a version's script.
//! - `validator`: checking raw values against widget domains.

pub mod binder;
pub mod state;
pub mod validator;

pub use binder::{BoundItem, Choice, ItemBinder, UserInput};
pub use state::{Session, VersionBinding, NO_CATEGORY};
pub use validator::{validate, DisplayState, INVALID_SENTINEL};
