// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff specs. `show` decodes offline, so no server is needed.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

#[path = "common.rs"]
mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::*;

fn token() -> String {
    let json = serde_json::json!({
        "v": 1,
        "messages": [{
            "id": "m1",
            "text": "hi",
            "senderId": "u2",
            "senderName": "Bob",
            "timestamp": "2025-01-02T03:04:05Z",
            "pending": false
        }],
        "participants": {"u2": {"id": "u2", "displayName": "Bob"}}
    });
    URL_SAFE_NO_PAD.encode(json.to_string())
}

#[test]
fn show_decodes_bare_token() {
    parley()
        .args(["handoff", "show", &token()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Participants:"))
        .stdout(predicate::str::contains("[2025-01-02 03:04] Bob: hi"));
}

#[test]
fn show_decodes_url() {
    let url = format!("https://app.example/open?chat=c1&session={}", token());

    parley()
        .args(["handoff", "show", &url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob: hi"));
}

#[test]
fn show_json_output() {
    let output = parley()
        .args(["handoff", "show", &token(), "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let messages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(messages[0]["id"], "m1");
    assert_eq!(messages[0]["senderName"], "Bob");
}

#[yare::parameterized(
    garbage = { "%%%" },
    truncated = { "eyJ2Ijox" },
)]
fn show_malformed_token_fails(input: &str) {
    parley()
        .args(["handoff", "show", input])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: invalid handoff token"));
}

#[test]
fn show_url_without_session_fails_with_hint() {
    parley()
        .args(["handoff", "show", "https://app.example/open?chat=c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no session token"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn export_needs_reachable_server() {
    let temp = init_temp();

    parley()
        .args(["handoff", "export", "c1"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("server unreachable"));
}
