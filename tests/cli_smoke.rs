mod support;

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn todo_help_works() {
    Command::cargo_bin("todo")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("persistent to-do list"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["add", "list", "toggle", "edit", "delete", "summary", "ui"];

    for cmd in subcommands {
        Command::cargo_bin("todo")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn fresh_store_lists_empty_state() {
    let store = support::TestStore::new();
    store
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks here yet"))
        .stdout(contains("0 tasks remaining"));
    assert!(!store.store_path().exists());
}
