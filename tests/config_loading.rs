use pagepilot_cli::{ConfigError, PagePilotConfig, ScriptError, TaskScript};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn file_then_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepilot.yaml");
    std::fs::write(
        &path,
        "browser:\n  debugger_url: \"http://127.0.0.1:9333\"\ntempo:\n  poll_interval_ms: 50\nscreenshots_dir: shots\n",
    )
    .unwrap();

    env::set_var("PAGEPILOT__TEMPO__POLL_INTERVAL_MS", "25");
    let loaded = PagePilotConfig::load(Some(path.as_path()));
    env::remove_var("PAGEPILOT__TEMPO__POLL_INTERVAL_MS");

    let loaded = loaded.unwrap();
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.config.browser.debugger_url, "http://127.0.0.1:9333");
    assert_eq!(loaded.config.tempo.poll_interval_ms, 25);
    assert_eq!(loaded.config.tempo.navigate_settle_ms, 3000);
    assert_eq!(loaded.config.screenshots_dir, PathBuf::from("shots"));
}

#[test]
#[serial]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = PagePilotConfig::load(Some(missing.as_path())).err().unwrap();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
#[serial]
fn unknown_env_override_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagepilot.yaml");
    std::fs::write(&path, "{}\n").unwrap();

    env::set_var("PAGEPILOT__LOCATOR__RETRIES", "3");
    let result = PagePilotConfig::load(Some(path.as_path()));
    env::remove_var("PAGEPILOT__LOCATOR__RETRIES");

    assert!(matches!(result.err(), Some(ConfigError::UnsupportedKey(_))));
}

#[test]
#[serial]
fn script_placeholders_resolve_from_environment() {
    let script = TaskScript::from_yaml_str(
        "name: login\nsteps:\n  - tool: fill_input\n    args: { selectors: [\"#email\"], value: \"${PAGEPILOT_TEST_EMAIL}\" }\n",
    )
    .unwrap();

    env::remove_var("PAGEPILOT_TEST_EMAIL");
    let err = script.resolve_env().unwrap_err();
    assert!(matches!(err, ScriptError::UnsetVariable { step: 1, .. }));

    env::set_var("PAGEPILOT_TEST_EMAIL", "me@example.com");
    let resolved = script.resolve_env();
    env::remove_var("PAGEPILOT_TEST_EMAIL");

    let resolved = resolved.unwrap();
    assert_eq!(
        serde_json::to_value(&resolved.steps[0]).unwrap()["args"]["value"],
        "me@example.com"
    );
}

#[test]
fn shipped_examples_parse() {
    let config = PagePilotConfig::from_yaml_str(include_str!("../config/pagepilot.example.yaml"))
        .unwrap();
    assert_eq!(config, PagePilotConfig::default());

    for path in ["scripts/chaicode-signup.yaml", "scripts/github-login.yaml"] {
        let script = TaskScript::from_file(std::path::Path::new(path)).unwrap();
        assert!(!script.steps.is_empty(), "{}", path);
    }
}
