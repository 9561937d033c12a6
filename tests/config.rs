use std::fs;

use todo_list::config::{Config, CONFIG_FILE};

#[test]
fn load_from_dir_defaults_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "store = 123").expect("write invalid config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.store.key, "todos");
    assert_eq!(cfg.ui.poll_ms, 120);
}

#[test]
fn load_from_dir_defaults_on_out_of_range_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let content = r#"
[store]
key = "errands"

[ui]
poll_ms = 999999
"#;
    fs::write(dir.path().join(CONFIG_FILE), content.trim()).expect("write config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.store.key, "todos");
}

#[test]
fn resolve_reads_explicit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[store]\nkey = \"errands\"\nlock_timeout_ms = 10").expect("write config");

    let cfg = Config::resolve(Some(&path)).expect("resolve");
    assert_eq!(cfg.store.key, "errands");
    assert_eq!(cfg.store.lock_timeout_ms, 10);
}

#[test]
fn resolve_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Config::resolve(Some(&dir.path().join("absent.toml"))).expect_err("missing file");
    assert_eq!(err.exit_code(), 4);
}
