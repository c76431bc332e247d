// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use clap::Parser;

fn parse(args: &[&str]) -> Command {
    Cli::try_parse_from(args).unwrap().command
}

#[test]
fn parse_init() {
    match parse(&[
        "parley", "init", "--server", "http://h:1", "--user", "u1", "--name", "Alice",
    ]) {
        Command::Init {
            server,
            user,
            name,
            interval_ms,
        } => {
            assert_eq!(server, "http://h:1");
            assert_eq!(user, "u1");
            assert_eq!(name, "Alice");
            assert_eq!(interval_ms, None);
        }
        _ => panic!("expected Init"),
    }
}

#[test]
fn parse_init_requires_identity() {
    assert!(Cli::try_parse_from(["parley", "init", "--server", "http://h:1"]).is_err());
    assert!(Cli::try_parse_from([
        "parley", "init", "--server", "http://h:1", "--user", " ", "--name", "A"
    ])
    .is_err());
}

#[test]
fn parse_init_rejects_zero_interval() {
    assert!(Cli::try_parse_from([
        "parley",
        "init",
        "--server",
        "http://h:1",
        "--user",
        "u1",
        "--name",
        "A",
        "--interval-ms",
        "0"
    ])
    .is_err());
}

#[test]
fn parse_new_with_members() {
    match parse(&["parley", "new", "Dinner", "-m", "u2", "--member", "u3", "-o", "json"]) {
        Command::New {
            name,
            members,
            output,
        } => {
            assert_eq!(name, "Dinner");
            assert_eq!(members, vec!["u2", "u3"]);
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("expected New"),
    }
}

#[test]
fn parse_send_keeps_text_verbatim() {
    // Blank text is rejected by the command, not the parser.
    match parse(&["parley", "send", "c1", "   "]) {
        Command::Send { chat, text } => {
            assert_eq!(chat, "c1");
            assert_eq!(text, "   ");
        }
        _ => panic!("expected Send"),
    }
}

#[test]
fn parse_log_defaults_to_text() {
    match parse(&["parley", "log", "c1"]) {
        Command::Log { output, .. } => assert_eq!(output, OutputFormat::Text),
        _ => panic!("expected Log"),
    }
}

#[test]
fn parse_chat_with_handoff() {
    match parse(&["parley", "chat", "c1", "--handoff", "https://x/?session=abc"]) {
        Command::Chat { chat, handoff } => {
            assert_eq!(chat, "c1");
            assert_eq!(handoff.as_deref(), Some("https://x/?session=abc"));
        }
        _ => panic!("expected Chat"),
    }
}

#[test]
fn parse_handoff_subcommands() {
    match parse(&["parley", "handoff", "export", "c1", "--base", "https://app"]) {
        Command::Handoff(HandoffCommand::Export { chat, base }) => {
            assert_eq!(chat, "c1");
            assert_eq!(base.as_deref(), Some("https://app"));
        }
        _ => panic!("expected Handoff Export"),
    }
    match parse(&["parley", "handoff", "show", "abc", "-o", "json"]) {
        Command::Handoff(HandoffCommand::Show { input, output }) => {
            assert_eq!(input, "abc");
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("expected Handoff Show"),
    }
}

#[test]
fn parse_invalid_output_format() {
    assert!(Cli::try_parse_from(["parley", "log", "c1", "-o", "yaml"]).is_err());
}
