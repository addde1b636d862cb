// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod locate;
pub mod logging;
pub mod script;
pub mod session;
pub mod settings;
pub mod types;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, FlagPicker};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging::TracingSink;
use crate::session::state::find_item;
use crate::session::{Session, UserInput};
use crate::settings::Settings;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings + workspace directories
/// - session open (config → save files → scripts)
/// - item listing, `--set` commits and `--export`
pub fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let settings = effective_settings(fs.as_ref(), &args)?;
    settings.ensure_workspace(fs.as_ref())?;

    let Some(config_path) = args.config.clone() else {
        info!("no config given; nothing to open");
        return Ok(());
    };

    let mut session = Session::new(Arc::clone(&fs), Arc::new(TracingSink), settings);
    let mut picker = FlagPicker::from_args(&args);
    session.open(&config_path, &mut picker)?;

    if let Some(name) = &args.version_name {
        session.select_version(name)?;
    }
    let version = session
        .current_version()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("session has no versions"))?;

    for (item_name, text) in &args.assignments {
        let binding = session.binding(&version)?;
        let item = find_item(&binding.config, item_name)?;
        let input = UserInput::from_text(&item.widget, text)
            .map_err(|reason| anyhow!("item \"{item_name}\": {reason}"))?;
        let display = session.commit(&version, item_name, input)?;
        println!("set {item_name} = {}", display.display_text());
    }

    print_items(&session, &version)?;

    if let Some(destination) = &args.export {
        let written = session.export(&version, destination)?;
        println!("exported {written} bytes to {}", destination.display());
    }

    session.close();
    Ok(())
}

/// Settings file values with command-line overrides applied.
fn effective_settings(fs: &dyn FileSystem, args: &CliArgs) -> Result<Settings> {
    let mut settings = Settings::load(fs, &args.settings)?;
    if let Some(dir) = &args.script_dir {
        settings.script_dir = dir.clone();
    }
    if let Some(dir) = &args.config_dir {
        settings.config_dir = dir.clone();
    }
    if let Some(dir) = &args.save_dir {
        settings.save_dir = dir.clone();
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Print every item of `version`, grouped by category.
fn print_items(session: &Session, version: &str) -> Result<()> {
    let binding = session.binding(version)?;
    println!("version {version}");
    println!("  save file: {}", binding.save_file.display());
    println!("  script:    {}", binding.script_path.display());
    println!();

    let binder = session.binder(version)?;
    for category in session.categories(version)? {
        println!("[{category}]");
        for item in session.items_in(version, &category)? {
            match binder.bind(item) {
                Ok(bound) => {
                    let lock = if bound.is_editable() { "" } else { " (disabled)" };
                    println!(
                        "  {:<24} {:<5} {}{lock}",
                        item.name,
                        item.widget.kind(),
                        bound.display.display_text()
                    );
                }
                Err(err) => println!("  {:<24} {:<5} error: {err}", item.name, item.widget.kind()),
            }
        }
    }
    Ok(())
}
