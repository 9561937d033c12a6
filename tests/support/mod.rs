#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch home for one test: store file, config dir and editor scripts
/// all live under a temp dir.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// `todo` bound to this store, isolated from the caller's environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("todo").expect("binary");
        cmd.env("TODO_STORE", self.store_path())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("XDG_DATA_HOME", self.root().join("data"))
            .env_remove("TODO_KEY")
            .env_remove("TODO_CONFIG")
            .env_remove("VISUAL")
            .env_remove("EDITOR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `todo` with `args` and require success.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().expect("run todo");
        assert!(
            output.status.success(),
            "todo {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }

    /// Run `todo --json` with `args` and return the `data` payload.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run(&full);
        let envelope: Value = serde_json::from_str(&stdout).expect("json envelope");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Raw key/value file contents.
    pub fn write_store(&self, contents: &str) {
        fs::write(self.store_path(), contents).expect("write store");
    }

    /// Seed `key` with a raw blob string.
    pub fn seed(&self, key: &str, blob: &str) {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), Value::String(blob.to_string()));
        self.write_store(&serde_json::to_string(&map).expect("serialize store"));
    }

    /// Parsed task list stored under `key`, if any.
    pub fn blob(&self, key: &str) -> Option<Value> {
        let contents = fs::read_to_string(self.store_path()).ok()?;
        let map: Value = serde_json::from_str(&contents).expect("store is json");
        let raw = map.get(key)?.as_str()?;
        Some(serde_json::from_str(raw).expect("blob is json"))
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    /// An executable shell script usable as `$EDITOR`.
    #[cfg(unix)]
    pub fn editor_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_file(name, &format!("#!/bin/sh\n{body}\n"));
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }
}
