// src/logging.rs

//! Logging for `saveprobe`.
//!
//! Two layers live here:
//!
//! - the global `tracing` subscriber, installed once by the binary;
//! - the session message channel ([`MessageSink`]), a small leveled channel
//!   that the session and the script `print` function write to.
//!
//! Priority for determining the subscriber level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SAVEPROBE_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that item listings on stdout stay clean.

use std::fmt::Debug;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::types::MessageLevel;

/// Target used for messages emitted by save-format scripts.
pub const SCRIPT_TARGET: &str = "saveprobe::script";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("SAVEPROBE_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

/// Leveled message channel shared by a session and its scripts.
pub trait MessageSink: Send + Sync + Debug {
    fn emit(&self, level: MessageLevel, message: &str);
}

/// Default sink: forwards every message to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn emit(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Info => info!(level = %level, "{message}"),
            MessageLevel::Warning => warn!(level = %level, "{message}"),
            MessageLevel::Error => error!(level = %level, "{message}"),
            MessageLevel::Fatal => error!(level = %level, fatal = true, "{message}"),
            MessageLevel::Script => info!(target: SCRIPT_TARGET, level = %level, "{message}"),
        }
    }
}
