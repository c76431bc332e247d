// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Init, help and version specs.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

#[path = "common.rs"]
mod common;

use common::*;

#[test]
fn creates_parley_directory() {
    let temp = TempDir::new().unwrap();

    parley()
        .args([
            "init",
            "--server",
            "http://127.0.0.1:8000",
            "--user",
            "u1",
            "--name",
            "Alice",
        ])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized parley at"));

    let config = std::fs::read_to_string(temp.path().join(".parley/config.toml")).unwrap();
    assert!(config.contains("url = \"http://127.0.0.1:8000\""));
    assert!(config.contains("user_id = \"u1\""));
    assert!(config.contains("display_name = \"Alice\""));
}

#[test]
fn fails_if_already_initialized() {
    let temp = init_temp();

    parley()
        .args(["init", "--server", "http://h:1", "--user", "u1", "--name", "A"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn interval_option_is_saved() {
    let temp = TempDir::new().unwrap();

    parley()
        .args([
            "init",
            "--server",
            "http://h:1",
            "--user",
            "u1",
            "--name",
            "A",
            "--interval-ms",
            "750",
        ])
        .current_dir(temp.path())
        .assert()
        .success();

    let config = std::fs::read_to_string(temp.path().join(".parley/config.toml")).unwrap();
    assert!(config.contains("interval_ms = 750"));
}

#[test]
fn rejects_non_http_server() {
    let temp = TempDir::new().unwrap();

    parley()
        .args(["init", "--server", "chat.example", "--user", "u1", "--name", "A"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: invalid server URL"))
        .stderr(predicate::str::contains("hint:"));

    assert!(!temp.path().join(".parley").exists());
}

#[test]
fn directory_flag_targets_other_directory() {
    let temp = TempDir::new().unwrap();

    parley()
        .arg("-C")
        .arg(temp.path())
        .args(["init", "--server", "http://h:1", "--user", "u1", "--name", "A"])
        .assert()
        .success();

    assert!(temp.path().join(".parley/config.toml").exists());
}

#[test]
fn network_commands_need_init() {
    let temp = TempDir::new().unwrap();

    parley()
        .args(["log", "c1"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("parley init"));
}

#[test]
fn help_lists_commands() {
    parley()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("handoff"));
}

#[test]
fn version_prints_name() {
    parley()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("parley "));
}
