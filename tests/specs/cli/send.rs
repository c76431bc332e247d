// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Send and log specs that need no live server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

#[path = "common.rs"]
mod common;

use common::*;

#[yare::parameterized(
    empty = { "" },
    spaces = { "   " },
    tabs_and_newlines = { "\t\n" },
)]
fn blank_text_is_rejected_before_any_io(text: &str) {
    // Not initialized on purpose: validation runs first.
    let temp = TempDir::new().unwrap();

    parley()
        .args(["send", "c1", text])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: message text is empty"));
}

#[test]
fn send_to_unreachable_server_fails() {
    let temp = init_temp();

    parley()
        .args(["send", "c1", "hello"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn log_from_unreachable_server_fails() {
    let temp = init_temp();

    parley()
        .args(["log", "c1"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("server unreachable"));
}

#[test]
fn log_level_is_configurable() {
    let temp = init_temp();

    parley()
        .args(["log", "c1"])
        .env("PARLEY_LOG", "debug")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("polling started"));
}
