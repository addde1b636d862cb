mod common;
use crate::common::{init_tracing, scripts, MockWorkspace};

use std::error::Error;
use std::path::{Path, PathBuf};

use saveprobe::errors::{ResolutionError, SaveprobeError, ScriptError};
use saveprobe::fs::FileSystem;
use saveprobe::locate::{NoPicker, Picker};
use saveprobe::session::{DisplayState, UserInput, NO_CATEGORY};
use saveprobe::types::MessageLevel;
use saveprobe_test_utils::builders::{config_document, redirect_document, VersionJsonBuilder};

type TestResult = Result<(), Box<dyn Error>>;

/// Picker that answers save-file questions with the first candidate and
/// script questions with a fixed path.
#[derive(Default)]
struct FirstChoice {
    script: Option<PathBuf>,
    script_requests: Vec<PathBuf>,
}

impl Picker for FirstChoice {
    fn pick_save_file(&mut self, _version: &str, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.first().cloned()
    }

    fn pick_script(&mut self, _version: &str, expected: &Path) -> Option<PathBuf> {
        self.script_requests.push(expected.to_path_buf());
        self.script.clone()
    }
}

fn kv_version() -> VersionJsonBuilder {
    VersionJsonBuilder::new("kv", r"data\.txt$")
        .save_path(r"^slot\d$")
        .int_item("Gold", "gold", 0, 9999)
        .int_item("Level", "level", 1, 99)
        .in_category("Hero")
        .bool_item("Hard mode", "hard", 1, 0)
        .in_category("Options")
        .list_item("Class", "class", &[(10, "A"), (20, "B")])
        .in_category("Hero")
}

fn kv_workspace() -> MockWorkspace {
    let ws = MockWorkspace::new();
    ws.add_script("kv", scripts::KEY_VALUE);
    ws.add_save("slot1/data.txt", "gold=120\nlevel=7\nhard=0\nclass=20\n");
    ws
}

#[test]
fn opens_every_version_and_defaults_to_the_first() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    ws.add_script("bytes", scripts::BYTE_OFFSET);
    ws.add_save("slot1/data.bin", vec![1u8, 2, 3]);
    let config = ws.add_config(
        "game.json",
        &config_document(vec![
            ("2.0.0", kv_version().build()),
            (
                "1.0.0",
                VersionJsonBuilder::new("bytes", r"data\.bin$")
                    .save_path(r"^slot\d$")
                    .build(),
            ),
        ]),
    );

    let mut session = ws.session();
    session.open(&config, &mut NoPicker)?;

    assert!(session.is_open());
    assert_eq!(session.config_path(), Some(config.as_path()));
    assert_eq!(session.versions(), vec!["1.0.0", "2.0.0"]);
    assert_eq!(session.current_version(), Some("1.0.0"));

    let binding = session.binding("2.0.0")?;
    assert_eq!(binding.save_file, PathBuf::from("save/slot1/data.txt"));
    assert_eq!(binding.script_path, PathBuf::from("script/kv.lua"));

    session.select_version("2.0.0")?;
    assert_eq!(session.current_version(), Some("2.0.0"));
    assert!(matches!(
        session.select_version("9.9.9"),
        Err(SaveprobeError::Resolution(ResolutionError::UnknownVersion(_)))
    ));
    Ok(())
}

#[test]
fn categories_group_uncategorised_items_first() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut session = ws.session();
    session.open(&config, &mut NoPicker)?;

    assert_eq!(
        session.categories("1.0.0")?,
        vec![NO_CATEGORY.to_string(), "Hero".to_string(), "Options".to_string()]
    );
    let names = |category: &str| -> Result<Vec<String>, SaveprobeError> {
        Ok(session
            .items_in("1.0.0", category)?
            .into_iter()
            .map(|item| item.name.clone())
            .collect())
    };
    assert_eq!(names(NO_CATEGORY)?, vec!["Gold"]);
    assert_eq!(names("Hero")?, vec!["Level", "Class"]);
    assert_eq!(names("Options")?, vec!["Hard mode"]);
    Ok(())
}

#[test]
fn bind_commit_and_export_round_trip() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut session = ws.session();
    session.open(&config, &mut NoPicker)?;

    let shown: Vec<String> = session
        .bind_all("1.0.0")?
        .into_iter()
        .map(|(_, bound)| bound.map(|b| b.display.display_text()))
        .collect::<Result<_, _>>()?;
    assert_eq!(shown, vec!["120", "7", "[ ]", "B"]);

    let display = session.commit("1.0.0", "Gold", UserInput::Text("500".to_string()))?;
    assert_eq!(display, DisplayState::Int { value: 500 });
    session.commit("1.0.0", "Hard mode", UserInput::Toggle(true))?;
    assert!(matches!(
        session.commit("1.0.0", "Mana", UserInput::Text("1".to_string())),
        Err(SaveprobeError::UnknownItem(name)) if name == "Mana"
    ));

    let out = Path::new("save/slot1/data.txt.edited");
    let written = session.export("1.0.0", out)?;

    let exported = ws.fs.read_to_string(out)?;
    assert_eq!(exported, "gold=500\nlevel=7\nhard=1\nclass=20\n");
    assert_eq!(written, exported.len());
    Ok(())
}

#[test]
fn failing_version_leaves_the_session_closed() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    // The second version has no matching save directory.
    let config = ws.add_config(
        "game.json",
        &config_document(vec![
            ("1.0.0", kv_version().build()),
            (
                "1.1.0",
                VersionJsonBuilder::new("kv", r"data\.txt$")
                    .save_path("^nowhere$")
                    .build(),
            ),
        ]),
    );

    let mut session = ws.session();
    let err = session.open(&config, &mut NoPicker).unwrap_err();

    match &err {
        SaveprobeError::VersionInit { version, source } => {
            assert_eq!(version, "1.1.0");
            assert!(matches!(
                &**source,
                SaveprobeError::Resolution(ResolutionError::NoDirectoriesFound)
            ));
        }
        other => panic!("expected VersionInit, got {other:?}"),
    }
    assert!(!session.is_open());
    assert!(session.versions().is_empty());
    assert!(matches!(session.binding("1.0.0"), Err(SaveprobeError::NoSession)));

    let fatal = ws.sink.at(MessageLevel::Fatal);
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].contains("1.1.0"), "{}", fatal[0]);
    Ok(())
}

#[test]
fn reopening_replaces_the_previous_session() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    let good = ws.add_config("good.json", &config_document(vec![("1.0.0", kv_version().build())]));
    let bad = ws.add_config("bad.json", "{ not json");

    let mut session = ws.session();
    session.open(&good, &mut NoPicker)?;
    assert!(session.is_open());

    assert!(matches!(
        session.open(&bad, &mut NoPicker),
        Err(SaveprobeError::Config(_))
    ));
    assert!(!session.is_open());
    assert_eq!(session.config_path(), None);
    Ok(())
}

#[test]
fn redirected_config_opens_the_target() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    ws.add_config("real.json", &config_document(vec![("1.0.0", kv_version().build())]));
    let alias = ws.add_config("alias.json", &redirect_document("real.json"));

    let mut session = ws.session();
    session.open(&alias, &mut NoPicker)?;

    assert_eq!(session.config_path(), Some(alias.as_path()));
    assert_eq!(session.versions(), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn missing_filetype_fails_the_version() {
    init_tracing();
    let ws = kv_workspace();
    let config = ws.add_config(
        "game.json",
        &config_document(vec![("1.0.0", kv_version().without_filetype().build())]),
    );

    let mut session = ws.session();
    let err = session.open(&config, &mut NoPicker).unwrap_err();

    assert!(matches!(
        err,
        SaveprobeError::VersionInit { ref source, .. }
            if matches!(**source, SaveprobeError::Resolution(ResolutionError::MissingFiletype))
    ));
    assert!(!session.is_open());
}

#[test]
fn missing_script_asks_the_picker() -> TestResult {
    init_tracing();
    let ws = MockWorkspace::new();
    ws.add_save("slot1/data.txt", "gold=1\n");
    let elsewhere = PathBuf::from("shared/kv-v2.lua");
    ws.fs.add_file(&elsewhere, scripts::KEY_VALUE);
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut picker = FirstChoice {
        script: Some(elsewhere.clone()),
        ..Default::default()
    };
    let mut session = ws.session();
    session.open(&config, &mut picker)?;

    assert_eq!(picker.script_requests, vec![PathBuf::from("script/kv.lua")]);
    assert_eq!(session.binding("1.0.0")?.script_path, elsewhere);
    assert_eq!(
        ws.sink.at(MessageLevel::Warning),
        vec!["script/kv.lua cannot be found. Choose a script yourself.".to_string()]
    );
    Ok(())
}

#[test]
fn declined_script_pick_is_script_not_found() {
    init_tracing();
    let ws = MockWorkspace::new();
    ws.add_save("slot1/data.txt", "gold=1\n");
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut session = ws.session();
    let err = session.open(&config, &mut FirstChoice::default()).unwrap_err();

    assert!(matches!(
        err,
        SaveprobeError::VersionInit { ref source, .. }
            if matches!(**source, SaveprobeError::Resolution(ResolutionError::ScriptNotFound(_)))
    ));
}

#[test]
fn ambiguous_save_files_use_the_picker() -> TestResult {
    init_tracing();
    let ws = kv_workspace();
    ws.add_save("slot2/data.txt", "gold=2\n");
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut session = ws.session();
    assert!(session.open(&config, &mut NoPicker).is_err());

    session.open(&config, &mut FirstChoice::default())?;
    assert_eq!(
        session.binding("1.0.0")?.save_file,
        PathBuf::from("save/slot1/data.txt")
    );
    Ok(())
}

#[test]
fn broken_script_fails_the_open() {
    init_tracing();
    let ws = MockWorkspace::new();
    ws.add_script("kv", scripts::LOAD_TIME_ERROR);
    ws.add_save("slot1/data.txt", "gold=1\n");
    let config = ws.add_config("game.json", &config_document(vec![("1.0.0", kv_version().build())]));

    let mut session = ws.session();
    let err = session.open(&config, &mut NoPicker).unwrap_err();

    assert!(matches!(
        err,
        SaveprobeError::VersionInit { ref source, .. }
            if matches!(**source, SaveprobeError::Script(ScriptError::Load(_)))
    ));
    assert_eq!(ws.sink.at(MessageLevel::Fatal).len(), 1);
}
