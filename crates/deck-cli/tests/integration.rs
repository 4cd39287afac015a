#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn deckforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deckforge").unwrap();
    cmd.env("DECKFORGE_HOME", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn json_out(dir: &TempDir, args: &[&str]) -> Value {
    let out = deckforge(dir).arg("--json").args(args).output().unwrap();
    assert!(
        out.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap()
}

fn config(dir: &TempDir) -> serde_yaml::Value {
    let raw = std::fs::read_to_string(dir.path().join("deckforge.yaml")).unwrap();
    serde_yaml::from_str(&raw).unwrap()
}

// ---------------------------------------------------------------------------
// Data directory
// ---------------------------------------------------------------------------

#[test]
fn first_use_writes_default_configuration() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default"));

    let cfg = config(&dir);
    assert_eq!(cfg["profiles"].as_sequence().unwrap().len(), 1);
    let page = &cfg["profiles"][0]["pages"][0];
    assert_eq!(page["name"].as_str(), Some("Page 1"));
    assert_eq!(page["buttons"].as_sequence().unwrap().len(), 18);
    assert_eq!(cfg["settings"]["bridgePort"].as_u64(), Some(9271));
}

#[test]
fn home_flag_overrides_environment() {
    let env_dir = TempDir::new().unwrap();
    let flag_dir = TempDir::new().unwrap();
    deckforge(&env_dir)
        .arg("--home")
        .arg(flag_dir.path())
        .args(["settings", "show"])
        .assert()
        .success();
    assert!(flag_dir.path().join("deckforge.yaml").exists());
    assert!(!env_dir.path().join("deckforge.yaml").exists());
}

// ---------------------------------------------------------------------------
// Profiles and pages
// ---------------------------------------------------------------------------

#[test]
fn profile_lifecycle() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["profile", "add", "Streaming", "--use"])
        .assert()
        .success();

    let profiles = json_out(&dir, &["profile", "list"]);
    let streaming = profiles
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Streaming")
        .unwrap();
    assert_eq!(streaming["active"], true);

    deckforge(&dir)
        .args(["profile", "rename", "Streaming", "Live"])
        .assert()
        .success();
    deckforge(&dir)
        .args(["profile", "delete", "Live"])
        .assert()
        .success();

    // Deleting the active profile falls back to the remaining one.
    let profiles = json_out(&dir, &["profile", "list"]);
    assert_eq!(profiles.as_array().unwrap().len(), 1);
    assert_eq!(profiles[0]["name"], "Default");
    assert_eq!(profiles[0]["active"], true);
}

#[test]
fn last_profile_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["profile", "delete", "Default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot delete the last profile"));
}

#[test]
fn unknown_profile_is_an_error() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["profile", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile not found: nope"));
}

#[test]
fn page_lifecycle_and_last_page_guard() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["page", "add", "Media"])
        .assert()
        .success();
    deckforge(&dir)
        .args(["page", "use", "Media"])
        .assert()
        .success();

    let pages = json_out(&dir, &["page", "list"]);
    assert_eq!(pages.as_array().unwrap().len(), 2);
    assert_eq!(pages[1]["active"], true);

    deckforge(&dir)
        .args(["page", "delete", "Media"])
        .assert()
        .success();
    let pages = json_out(&dir, &["page", "list"]);
    assert_eq!(pages[0]["active"], true);

    deckforge(&dir)
        .args(["page", "delete", "Page 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot delete the last page"));
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

#[test]
fn add_action_then_show() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args([
            "button",
            "add-action",
            "3",
            "open-url",
            "--param",
            "url=https://example.com",
        ])
        .assert()
        .success();
    deckforge(&dir)
        .args(["button", "set-label", "3", "Docs"])
        .assert()
        .success();

    let button = json_out(&dir, &["button", "show", "3"]);
    assert_eq!(button["id"], 3);
    assert_eq!(button["label"], "Docs");
    assert_eq!(button["actions"][0]["type"], "open-url");
    assert_eq!(button["actions"][0]["params"]["url"], "https://example.com");

    deckforge(&dir)
        .args(["button", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("open-url"));
}

#[test]
fn add_action_rejects_unknown_kind_and_bad_params() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["button", "add-action", "1", "teleport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action kind"));
    deckforge(&dir)
        .args(["button", "add-action", "1", "open-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing parameter 'url'"));
}

#[test]
fn button_ids_outside_layout_are_rejected() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["button", "set-enabled", "19", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid button id 19"));
}

#[test]
fn remove_action_and_clear() {
    let dir = TempDir::new().unwrap();
    for kind in ["media-mute", "media-next"] {
        deckforge(&dir)
            .args(["button", "add-action", "5", kind])
            .assert()
            .success();
    }
    deckforge(&dir)
        .args(["button", "remove-action", "5", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("media-mute"));
    let button = json_out(&dir, &["button", "show", "5"]);
    assert_eq!(button["actions"].as_array().unwrap().len(), 1);
    assert_eq!(button["actions"][0]["type"], "media-next");

    deckforge(&dir)
        .args(["button", "remove-action", "5", "4"])
        .assert()
        .failure();

    deckforge(&dir)
        .args(["button", "clear", "5"])
        .assert()
        .success();
    let button = json_out(&dir, &["button", "show", "5"]);
    assert!(button["actions"].as_array().unwrap().is_empty());
    assert_eq!(button["color"], "#1e293b");
}

// ---------------------------------------------------------------------------
// Trigger and run
// ---------------------------------------------------------------------------

#[test]
fn trigger_on_empty_button_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["trigger", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to run"));

    let out = json_out(&dir, &["trigger", "42"]);
    assert!(out["outcomes"].as_array().unwrap().is_empty());
}

#[test]
fn trigger_skips_disabled_button() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["button", "add-action", "2", "run-script", "--param", "script=exit 0"])
        .assert()
        .success();
    deckforge(&dir)
        .args(["button", "set-enabled", "2", "false"])
        .assert()
        .success();
    let out = json_out(&dir, &["trigger", "2"]);
    assert!(out["outcomes"].as_array().unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn trigger_runs_actions_in_order_and_continues_past_failure() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("ran.txt");
    deckforge(&dir)
        .args(["button", "add-action", "4", "run-script", "--param", "script=exit 3"])
        .assert()
        .success();
    deckforge(&dir)
        .args(["button", "add-action", "4", "run-script", "--param"])
        .arg(format!("script=echo second > '{}'", marker.display()))
        .assert()
        .success();

    let out = json_out(&dir, &["trigger", "4"]);
    let outcomes = out["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["succeeded"], false);
    assert!(outcomes[0]["errorMessage"]
        .as_str()
        .unwrap()
        .starts_with("Command failed: /bin/bash -c"));
    assert_eq!(outcomes[1]["succeeded"], true);
    assert_eq!(std::fs::read_to_string(&marker).unwrap().trim(), "second");
}

#[test]
fn run_unknown_kind_reports_failed_outcome() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["run", "not-a-kind"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failed: unknown action kind"));

    let outcome = json_out(&dir, &["run", "not-a-kind"]);
    assert_eq!(
        outcome,
        serde_json::json!({ "succeeded": false, "errorMessage": "unknown action kind" })
    );
}

#[test]
fn run_missing_param_names_it() {
    let dir = TempDir::new().unwrap();
    let outcome = json_out(&dir, &["run", "open-url"]);
    assert_eq!(outcome["succeeded"], false);
    assert_eq!(outcome["errorMessage"], "missing parameter 'url'");
}

#[cfg(target_os = "linux")]
#[test]
fn dry_run_prints_composed_command() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args([
            "run",
            "--dry-run",
            "mouse-click",
            "--json-params",
            r#"{"x": 10, "y": 20, "button": 3}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("xdotool mousemove 10 20 click 3"));

    let out = json_out(
        &dir,
        &["run", "--dry-run", "insert-text", "--param", "text=hello"],
    );
    assert_eq!(out["command"], "xclip -selection clipboard");
    assert_eq!(out["stdin"], "hello");
}

#[test]
fn dry_run_composes_for_another_platform() {
    let dir = TempDir::new().unwrap();
    let out = json_out(
        &dir,
        &[
            "run",
            "--dry-run",
            "--platform",
            "windows",
            "open-url",
            "--param",
            "url=https://example.com",
        ],
    );
    assert_eq!(out["platform"], "windows");
    assert_eq!(out["command"], "cmd /C start \"\" https://example.com");

    deckforge(&dir)
        .args(["run", "--dry-run", "--platform", "beos", "media-mute"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported platform: beos"));
}

#[test]
fn platform_override_requires_dry_run() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["run", "--platform", "macos", "media-mute"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// Settings, shortcuts, doctor
// ---------------------------------------------------------------------------

#[test]
fn settings_round_trip() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["settings", "set-port", "9400"])
        .assert()
        .success();
    deckforge(&dir)
        .args(["settings", "bridge", "on"])
        .assert()
        .success();

    let settings = json_out(&dir, &["settings", "show"]);
    assert_eq!(settings["bridgePort"], 9400);
    assert_eq!(settings["bridgeEnabled"], true);
    assert_eq!(settings["keyboardModeEnabled"], true);
}

#[test]
fn validate_flags_unknown_action_kinds() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .args(["settings", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));

    // Hand-edit the file to carry a kind the catalog does not know.
    let path = dir.path().join("deckforge.yaml");
    let mut cfg = config(&dir);
    cfg["profiles"][0]["pages"][0]["buttons"][0]["actions"] =
        serde_yaml::from_str("[{type: teleport, params: {}}]").unwrap();
    std::fs::write(&path, serde_yaml::to_string(&cfg).unwrap()).unwrap();

    deckforge(&dir)
        .args(["settings", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown action 'teleport'"));
}

#[test]
fn shortcuts_table_lists_every_button() {
    let dir = TempDir::new().unwrap();
    deckforge(&dir)
        .arg("shortcuts")
        .assert()
        .success()
        .stdout(predicate::str::contains("CommandOrControl+Alt+Shift+1"))
        .stdout(predicate::str::contains("CommandOrControl+Alt+Shift+A"))
        .stdout(predicate::str::contains("CommandOrControl+Alt+Shift+I"));

    let table = json_out(&dir, &["shortcuts"]);
    assert_eq!(table.as_array().unwrap().len(), 18);
    assert_eq!(table[9]["button"], 10);
}

#[test]
fn doctor_reports_platform_tools() {
    let dir = TempDir::new().unwrap();
    let report = json_out(&dir, &["doctor"]);
    assert!(report["platform"].is_string());
    assert!(!report["tools"].as_array().unwrap().is_empty());
}
