// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn parley() -> Command {
    cargo_bin_cmd!("parley")
}

/// A server URL nothing listens on.
pub fn dead_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Helper to create an initialized temp directory pointing at `server`
pub fn init_temp_with(server: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    parley()
        .args(["init", "--server", server, "--user", "u1", "--name", "Alice"])
        .current_dir(temp.path())
        .assert()
        .success();
    // Keep unreachable-server specs quick.
    let config_path = temp.path().join(".parley/config.toml");
    let config = std::fs::read_to_string(&config_path)
        .unwrap()
        .replace("timeout_secs = 10", "timeout_secs = 2")
        .replace("interval_ms = 2000", "interval_ms = 100");
    std::fs::write(&config_path, config).unwrap();
    temp
}

/// Helper to create an initialized temp directory with no live server
pub fn init_temp() -> TempDir {
    init_temp_with(&dead_server())
}
