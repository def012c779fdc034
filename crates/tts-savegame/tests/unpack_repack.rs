//! Integration tests for unpacking savegames into directory trees and back.

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tts_luabundle::{BundleError, Bundler, ModuleMap};
use tts_savegame::{Config, SavegameError, UnpackedSavegame, repack, unpack};
use walkdir::WalkDir;

fn setup() -> (TempDir, UnpackedSavegame, Config) {
    let temp = TempDir::new().expect("temp dir");
    let config = Config::default();
    let unpacked = UnpackedSavegame::new(temp.path().join("mod"), config.json_format());
    (temp, unpacked, config)
}

/// Every file under `root` with its contents, in path order.
fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.expect("walk"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .expect("inside root")
                .to_path_buf();
            (relative, fs::read(entry.path()).expect("read"))
        })
        .collect()
}

fn bundle(modules: &[(&str, &str)], root: &str) -> String {
    let modules: ModuleMap = modules
        .iter()
        .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
        .collect();
    let mut bundler = Bundler::new().expect("engine starts");
    bundler.load_modules(&modules).expect("modules load");
    let script = bundler.bundle(root).expect("bundle succeeds");
    bundler.close().expect("engine shuts down");
    script
}

fn sample_savegame() -> Value {
    json!({
        "SaveName": "Arkham",
        "GameMode": "Arkham Horror",
        "LuaScript": "function onLoad()\n  print('loaded')\nend\n",
        "LuaScriptState": "{\"turn\":4}",
        "XmlUI": "<Panel id=\"root\"/>",
        "Note": "Setup on page 3",
        "ObjectStates": [
            {
                "GUID": "a1b2c3",
                "Name": "Bag",
                "Transform": {"posX": 1.5, "posY": 0.0, "posZ": -2.25},
                "LuaScriptState": "not json",
                "ContainedObjects": [
                    {"GUID": "d4e5f6", "Name": "Card", "Nickname": "Ace"},
                    {"GUID": "d4e5f6", "Name": "Card", "Nickname": "Duplicate"}
                ]
            },
            {
                "Name": "Token",
                "LuaScript": "print('token')",
                "XmlUI": "<Text>hi</Text>",
                "ContainedObjects": []
            }
        ]
    })
}

/// Repacking an unpacked savegame gives back the same document.
#[test]
fn test_round_trip() {
    let (_temp, unpacked, config) = setup();
    let savegame = sample_savegame();

    unpack(&savegame, &unpacked, &config).expect("unpack");
    let repacked = repack(&unpacked, &config).expect("repack");

    assert_eq!(repacked, savegame);
}

/// Scalar fields land in their own files and residual documents keep
/// everything else.
#[test]
fn test_unpacked_layout() {
    let (_temp, unpacked, config) = setup();
    unpack(&sample_savegame(), &unpacked, &config).expect("unpack");
    let root = unpacked.path();

    assert_eq!(
        fs::read_to_string(root.join("script.lua")).expect("script"),
        "function onLoad()\n  print('loaded')\nend\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("note.txt")).expect("note"),
        "Setup on page 3"
    );
    assert_eq!(
        fs::read_to_string(root.join("objects/index.list")).expect("index"),
        "a1b2c3\nobject\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("objects/a1b2c3/contained/index.list")).expect("index"),
        "d4e5f6\nd4e5f6-2\n"
    );

    let state: Value =
        serde_json::from_str(&fs::read_to_string(root.join("script-state.json")).expect("state"))
            .expect("state is json");
    assert_eq!(state, json!({"turn": 4}));

    let residual: Value =
        serde_json::from_str(&fs::read_to_string(root.join("savegame.json")).expect("residual"))
            .expect("residual is json");
    assert_eq!(
        residual,
        json!({"SaveName": "Arkham", "GameMode": "Arkham Horror"})
    );

    assert!(root.join("objects/object/ui.xml").is_file());
    assert!(!root.join("objects/object/contained").exists());
    assert!(!root.join("objects/a1b2c3/script.lua").exists());
    assert!(!root.join("modules").exists());
}

/// Unpacking the same document twice leaves a byte-identical tree.
#[test]
fn test_unpack_is_idempotent() {
    let (_temp, unpacked, config) = setup();
    let savegame = sample_savegame();

    unpack(&savegame, &unpacked, &config).expect("first unpack");
    let first = snapshot(unpacked.path());
    unpack(&savegame, &unpacked, &config).expect("second unpack");
    let second = snapshot(unpacked.path());

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

/// Reordering and removing objects is reflected on disk.
#[test]
fn test_reorder_and_prune_objects() {
    let (_temp, unpacked, config) = setup();
    let before = json!({
        "ObjectStates": [{"GUID": "aaa"}, {"GUID": "bbb"}, {"GUID": "ccc"}]
    });
    let after = json!({
        "ObjectStates": [{"GUID": "ccc"}, {"GUID": "aaa"}]
    });

    unpack(&before, &unpacked, &config).expect("unpack");
    assert!(unpacked.path().join("objects/bbb").is_dir());

    unpack(&after, &unpacked, &config).expect("unpack again");
    let objects = unpacked.path().join("objects");
    assert!(!objects.join("bbb").exists());
    assert_eq!(
        fs::read_to_string(objects.join("index.list")).expect("index"),
        "ccc\naaa\n"
    );
    assert_eq!(repack(&unpacked, &config).expect("repack"), after);
}

/// Fields that become empty are removed from the tree.
#[test]
fn test_cleared_fields_are_removed() {
    let (_temp, unpacked, config) = setup();
    unpack(&sample_savegame(), &unpacked, &config).expect("unpack");

    let cleared = json!({"SaveName": "Arkham"});
    unpack(&cleared, &unpacked, &config).expect("unpack again");

    let files: Vec<PathBuf> = snapshot(unpacked.path())
        .into_iter()
        .map(|(path, _)| path)
        .collect();
    assert_eq!(files, vec![PathBuf::from("savegame.json")]);
    assert_eq!(repack(&unpacked, &config).expect("repack"), cleared);
}

/// Shared modules are split out once and bundled back on repack.
#[test]
fn test_bundled_scripts_round_trip() {
    let (_temp, unpacked, config) = setup();
    let util = "local M = {}\nfunction M.add(a, b) return a + b end\nreturn M\n";
    let bag_script = "local util = require(\"util\")\nprint(util.add(1, 2))\n";
    let card_script = "local util = require(\"util\")\nprint(util.add(3, 4))\n";

    let savegame = json!({
        "SaveName": "Bundled",
        "ObjectStates": [
            {"GUID": "bag001", "LuaScript": bundle(&[("util", util)], bag_script)},
            {"GUID": "card01", "LuaScript": bundle(&[("util", util)], card_script)}
        ]
    });

    unpack(&savegame, &unpacked, &config).expect("unpack");
    let root = unpacked.path();

    assert_eq!(
        fs::read_to_string(root.join("modules/util.lua")).expect("module"),
        util
    );
    assert_eq!(
        fs::read_to_string(root.join("objects/bag001/script.lua")).expect("script"),
        bag_script
    );
    assert_eq!(
        fs::read_to_string(root.join("objects/card01/script.lua")).expect("script"),
        card_script
    );

    assert_eq!(repack(&unpacked, &config).expect("repack"), savegame);
}

/// Two objects embedding different sources for one module abort the unpack.
#[test]
fn test_inconsistent_modules_rejected() {
    let (_temp, unpacked, config) = setup();
    let savegame = json!({
        "ObjectStates": [
            {"GUID": "aaa", "LuaScript": bundle(&[("util", "return 1")], "require('util')")},
            {"GUID": "bbb", "LuaScript": bundle(&[("util", "return 2")], "require('util')")}
        ]
    });

    let err = unpack(&savegame, &unpacked, &config).unwrap_err();
    assert!(matches!(
        err,
        SavegameError::Bundle(BundleError::InconsistentModule { ref name }) if name == "util"
    ));
    assert!(err.is_recoverable());
}

/// With bundling disabled scripts are stored exactly as found.
#[test]
fn test_bundling_disabled() {
    let (_temp, unpacked, mut config) = setup();
    config.bundle.enabled = false;

    let script = bundle(&[("util", "return 1")], "require('util')");
    let savegame = json!({"ObjectStates": [{"GUID": "aaa", "LuaScript": script}]});

    unpack(&savegame, &unpacked, &config).expect("unpack");
    assert_eq!(
        fs::read_to_string(unpacked.path().join("objects/aaa/script.lua")).expect("script"),
        script
    );
    assert!(!unpacked.path().join("modules").exists());
    assert_eq!(repack(&unpacked, &config).expect("repack"), savegame);
}

/// Scripts requiring a module that is not in `modules/` are kept verbatim.
#[test]
fn test_repack_unresolved_module() {
    let (_temp, unpacked, config) = setup();
    unpack(&json!({"SaveName": "x"}), &unpacked, &config).expect("unpack");
    unpacked
        .script()
        .write_text("local missing = require('missing')")
        .expect("write script");

    let repacked = repack(&unpacked, &config).expect("repack");
    assert_eq!(
        repacked,
        json!({"SaveName": "x", "LuaScript": "local missing = require('missing')"})
    );
}

/// A script mentioning `require` inside a string is not bundled.
#[test]
fn test_require_in_string_round_trips() {
    let (_temp, unpacked, config) = setup();
    let savegame = json!({
        "ObjectStates": [{"GUID": "abc", "LuaScript": "print(\"type require('lib') in chat\")"}]
    });

    unpack(&savegame, &unpacked, &config).expect("unpack");
    assert_eq!(repack(&unpacked, &config).expect("repack"), savegame);
}

/// A plain script requiring a module provided by the game round-trips unchanged.
#[test]
fn test_require_of_unstored_module_round_trips() {
    let (_temp, unpacked, config) = setup();
    let savegame = json!({"LuaScript": "local json = require(\"json\")\nprint(json)"});

    unpack(&savegame, &unpacked, &config).expect("unpack");
    assert!(!unpacked.path().join("modules").exists());
    assert_eq!(repack(&unpacked, &config).expect("repack"), savegame);
}

#[test]
fn test_repack_without_savegame_json() {
    let (_temp, unpacked, config) = setup();
    fs::create_dir_all(unpacked.path()).expect("create dir");

    let err = repack(&unpacked, &config).unwrap_err();
    assert!(matches!(err, SavegameError::NotFound { ref path } if path.ends_with("savegame.json")));
}

#[test]
fn test_unpack_rejects_non_object_document() {
    let (_temp, unpacked, config) = setup();
    let err = unpack(&json!([1, 2, 3]), &unpacked, &config).unwrap_err();
    assert!(matches!(err, SavegameError::InvalidDocument { .. }));
}
