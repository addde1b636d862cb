// src/config/mod.rs

//! Version-configuration documents.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Read documents and follow `useInstead` redirects (`loader.rs`).
//! - Validate widgets and compile regexes (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, parse_document, resolve_config};
pub use model::{
    ConfigDocument, ConfigFile, Item, RawConfigFile, RawItem, RawVersionConfig, RawWidget,
    VersionConfig, Widget,
};
