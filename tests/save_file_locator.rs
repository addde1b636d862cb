mod common;
use crate::common::init_tracing;

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use regex::Regex;
use saveprobe::cli::{CliArgs, FlagPicker};
use saveprobe::config::VersionConfig;
use saveprobe::errors::ResolutionError;
use saveprobe::fs::mock::MockFileSystem;
use saveprobe::locate::{
    locate_directories, locate_files, locate_save_file, resolve_save_file, Located, NoPicker,
    Picker,
};

type TestResult = Result<(), Box<dyn Error>>;

fn version(save_paths: &[&str], files: &str) -> VersionConfig {
    VersionConfig {
        filetype: Some("kv".to_string()),
        save_file_paths: save_paths.iter().map(|p| Regex::new(p).unwrap()).collect(),
        files: Regex::new(files).unwrap(),
        items: Vec::new(),
    }
}

fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

/// Picker that records what it was offered and answers with a fixed index.
#[derive(Default)]
struct ScriptedPicker {
    answer: Option<usize>,
    offered: Vec<Vec<PathBuf>>,
}

impl Picker for ScriptedPicker {
    fn pick_save_file(&mut self, _version: &str, candidates: &[PathBuf]) -> Option<PathBuf> {
        self.offered.push(candidates.to_vec());
        self.answer.and_then(|i| candidates.get(i).cloned())
    }

    fn pick_script(&mut self, _version: &str, _expected: &Path) -> Option<PathBuf> {
        None
    }
}

fn three_slot_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("save/save1/data.bin", b"1".to_vec());
    fs.add_file("save/save2/data.bin", b"2".to_vec());
    fs.add_file("save/other/data.bin", b"3".to_vec());
    fs
}

#[test]
fn empty_patterns_yield_the_root() -> TestResult {
    init_tracing();
    let fs = three_slot_tree();
    let dirs = locate_directories(&fs, Path::new("save"), &[])?;
    assert_eq!(dirs, paths(&["save"]));
    Ok(())
}

#[test]
fn matching_slots_are_ambiguous() -> TestResult {
    init_tracing();
    let fs = three_slot_tree();
    let v = version(&[r"save\d+"], r"data\.bin$");

    let located = locate_save_file(&fs, Path::new("save"), &v)?;

    assert_eq!(
        located,
        Located::Ambiguous(vec![
            PathBuf::from("save/save1/data.bin"),
            PathBuf::from("save/save2/data.bin"),
        ])
    );
    Ok(())
}

#[test]
fn single_match_is_selected_without_asking() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("save/save1/data.bin", b"1".to_vec());
    fs.add_file("save/other/data.bin", b"3".to_vec());
    let v = version(&[r"save\d+"], r"data\.bin$");

    let mut picker = ScriptedPicker::default();
    let chosen = resolve_save_file(&fs, Path::new("save"), "1.0.0", &v, &mut picker)?;

    assert_eq!(chosen, PathBuf::from("save/save1/data.bin"));
    assert!(picker.offered.is_empty(), "picker must not be consulted");
    Ok(())
}

#[test]
fn ambiguous_match_uses_the_picker() -> TestResult {
    init_tracing();
    let fs = three_slot_tree();
    let v = version(&[r"save\d+"], r"data\.bin$");

    let mut picker = ScriptedPicker {
        answer: Some(1),
        ..Default::default()
    };
    let chosen = resolve_save_file(&fs, Path::new("save"), "1.0.0", &v, &mut picker)?;

    assert_eq!(chosen, PathBuf::from("save/save2/data.bin"));
    assert_eq!(picker.offered.len(), 1);
    assert_eq!(picker.offered[0].len(), 2);
    Ok(())
}

#[test]
fn cancelled_pick_is_no_file_selected() {
    init_tracing();
    let fs = three_slot_tree();
    let v = version(&[r"save\d+"], r"data\.bin$");

    let result = resolve_save_file(&fs, Path::new("save"), "1.0.0", &v, &mut NoPicker);
    assert!(matches!(result, Err(ResolutionError::NoFileSelected(2))));
}

#[test]
fn pick_outside_candidates_is_no_file_selected() {
    init_tracing();

    struct Stranger;
    impl Picker for Stranger {
        fn pick_save_file(&mut self, _: &str, _: &[PathBuf]) -> Option<PathBuf> {
            Some(PathBuf::from("save/other/data.bin"))
        }
        fn pick_script(&mut self, _: &str, _: &Path) -> Option<PathBuf> {
            None
        }
    }

    let fs = three_slot_tree();
    let v = version(&[r"save\d+"], r"data\.bin$");
    let result = resolve_save_file(&fs, Path::new("save"), "1.0.0", &v, &mut Stranger);
    assert!(matches!(result, Err(ResolutionError::NoFileSelected(_))));
}

#[test]
fn no_matching_directory_is_reported() {
    init_tracing();
    let fs = three_slot_tree();
    let v = version(&[r"^slot_"], r"data\.bin$");

    let result = locate_save_file(&fs, Path::new("save"), &v);
    assert!(matches!(result, Err(ResolutionError::NoDirectoriesFound)));
}

#[test]
fn no_matching_file_is_reported() {
    init_tracing();
    let fs = three_slot_tree();
    let v = version(&[r"save\d+"], r"\.sav$");

    let result = locate_save_file(&fs, Path::new("save"), &v);
    assert!(matches!(result, Err(ResolutionError::NoFilesFound)));
}

#[test]
fn multi_level_expansion_returns_only_leaf_matches() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("save/user1/slot1/main.dat", b"".to_vec());
    fs.add_file("save/user1/slot2/main.dat", b"".to_vec());
    fs.add_file("save/user1/backup/main.dat", b"".to_vec());
    fs.add_file("save/user2/slot1/main.dat", b"".to_vec());
    fs.add_file("save/admin/slot1/main.dat", b"".to_vec());
    // Files at intermediate levels are never directories and are skipped.
    fs.add_file("save/user1/readme.txt", b"".to_vec());

    let patterns = [Regex::new(r"^user\d$")?, Regex::new(r"^slot\d$")?];
    let dirs = locate_directories(&fs, Path::new("save"), &patterns)?;

    assert_eq!(
        dirs,
        paths(&["save/user1/slot1", "save/user1/slot2", "save/user2/slot1"])
    );
    Ok(())
}

#[test]
fn directory_names_match_unanchored() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("save/my_save_01");
    fs.add_dir("save/nothing");

    let dirs = locate_directories(&fs, Path::new("save"), &[Regex::new("save")?])?;
    assert_eq!(dirs, paths(&["save/my_save_01"]));
    Ok(())
}

#[test]
fn file_pattern_sees_the_full_path() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("save/a/data.bin", b"".to_vec());
    fs.add_file("save/b/data.bin", b"".to_vec());

    let dirs = paths(&["save/a", "save/b"]);
    let files = locate_files(&fs, &dirs, &Regex::new(r"/b/data\.bin$")?)?;

    assert_eq!(files, paths(&["save/b/data.bin"]));
    Ok(())
}

#[test]
fn missing_save_root_finds_no_directories() {
    init_tracing();
    let fs = MockFileSystem::new();
    let nested = version(&[r"save\d+"], r"data\.bin$");
    let flat = version(&[], r"data\.bin$");

    assert!(matches!(
        locate_save_file(&fs, Path::new("absent"), &nested),
        Err(ResolutionError::NoDirectoriesFound)
    ));
    assert!(matches!(
        locate_save_file(&fs, Path::new("absent"), &flat),
        Err(ResolutionError::NoDirectoriesFound)
    ));
}

#[test]
fn save_root_that_is_a_file_finds_no_directories() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("save", b"not a directory".to_vec());
    let v = version(&[], r"save$");

    assert!(matches!(
        locate_save_file(&fs, Path::new("save"), &v),
        Err(ResolutionError::NoDirectoriesFound)
    ));
}

#[test]
fn flag_picker_follows_pick_and_script_flags() -> TestResult {
    init_tracing();
    let candidates = vec![
        PathBuf::from("save/save1/data.bin"),
        PathBuf::from("save/save2/data.bin"),
    ];

    let args = CliArgs::try_parse_from(["saveprobe", "game.json"])?;
    let mut unset = FlagPicker::from_args(&args);
    assert_eq!(unset.pick_save_file("1.0.0", &candidates), None);
    assert_eq!(unset.pick_script("1.0.0", Path::new("script/kv.lua")), None);

    let args = CliArgs::try_parse_from([
        "saveprobe",
        "game.json",
        "--pick",
        "1",
        "--script",
        "alt/kv.lua",
    ])?;
    let mut flagged = FlagPicker::from_args(&args);
    assert_eq!(
        flagged.pick_save_file("1.0.0", &candidates),
        Some(PathBuf::from("save/save2/data.bin"))
    );
    assert_eq!(
        flagged.pick_script("1.0.0", Path::new("script/kv.lua")),
        Some(PathBuf::from("alt/kv.lua"))
    );

    let mut out_of_range = FlagPicker {
        save_index: Some(5),
        script: None,
    };
    assert_eq!(out_of_range.pick_save_file("1.0.0", &candidates), None);
    Ok(())
}
