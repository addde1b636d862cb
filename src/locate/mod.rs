// src/locate/mod.rs

//! Save-file discovery.
//!
//! - `discovery`: regex-driven, level-by-level directory expansion and file
//!   matching.
//! - `resolve`: the "exactly one, or ask" policy and the [`Picker`]
//!   collaborator.

pub mod discovery;
pub mod resolve;

pub use discovery::{locate_directories, locate_files};
pub use resolve::{locate_save_file, resolve_save_file, Located, NoPicker, Picker};
