// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::{TestContext, WAIT};
use crate::error::Error;
use pl_core::Message;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_log_prints_messages_in_order() {
    let ctx = TestContext::new();
    ctx.server.post("c1", "u2", "Bob", "first");
    ctx.server.post("c1", "u1", "Alice", "second");
    let mut out = Vec::new();

    run_impl(&ctx.engine, "c1", OutputFormat::Text, WAIT, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Bob: first"));
    assert!(lines[1].ends_with("Alice: second"));
}

#[tokio::test]
async fn test_log_empty_chat() {
    let ctx = TestContext::new();
    ctx.server.open("c1");
    let mut out = Vec::new();

    run_impl(&ctx.engine, "c1", OutputFormat::Text, WAIT, &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "No messages.\n");
}

#[tokio::test]
async fn test_log_json() {
    let ctx = TestContext::new();
    ctx.server.post("c1", "u2", "Bob", "hi");
    let mut out = Vec::new();

    run_impl(&ctx.engine, "c1", OutputFormat::Json, WAIT, &mut out)
        .await
        .unwrap();

    let messages: Vec<Message> = serde_json::from_slice(&out).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, "m1");
    assert!(!messages[0].pending);
}

#[tokio::test]
async fn test_log_reports_fetch_failure() {
    let ctx = TestContext::new();
    ctx.server.fail_fetch.store(true, Ordering::SeqCst);

    let err = run_impl(&ctx.engine, "c1", OutputFormat::Text, WAIT, &mut Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Core(pl_core::Error::Transport(_))));
    assert!(err.to_string().contains("connection refused"));
}
