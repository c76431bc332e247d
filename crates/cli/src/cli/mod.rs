// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "parley")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A polling chat client that keeps a local view in sync with a chat server")]
#[command(
    long_about = "A polling chat client that keeps a local view in sync with a chat server.\n\n\
    Messages you send show up immediately and are reconciled with the server's copy \
    once it comes back in a fetch."
)]
#[command(after_help = "\
Quickstart:
  parley init --server http://127.0.0.1:8000 --user u1 --name Alice
  parley new \"Dinner\" -m u2
  parley send <chat> \"hello\"
  parley chat <chat>")]
pub struct Cli {
    /// Run as if parley was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize parley in the current directory
    #[command(after_help = "\
Examples:
  parley init --server http://127.0.0.1:8000 --user u1 --name Alice
  parley init --server https://chat.example --user u2 --name Bob --interval-ms 5000")]
    Init {
        /// Chat server base URL
        #[arg(long)]
        server: String,

        /// Your user id on the server
        #[arg(long, value_parser = non_empty_string)]
        user: String,

        /// Display name shown next to your messages
        #[arg(long, value_parser = non_empty_string)]
        name: String,

        /// Polling interval in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// Create a new chat with you and the given members
    New {
        /// Chat name
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Member user id(s) to add (repeatable)
        #[arg(long = "member", short = 'm')]
        members: Vec<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Add a user to a chat
    Invite {
        /// Chat id
        chat: String,

        /// User id to add
        user: String,
    },

    /// Send one message and wait for the server to confirm it
    #[command(after_help = "\
Examples:
  parley send c1 \"on my way\"          Print the server's message id once stored")]
    Send {
        /// Chat id
        chat: String,

        /// Message text
        text: String,
    },

    /// Print the messages of a chat
    Log {
        /// Chat id
        chat: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Chat interactively: stdin lines are sent, new messages are printed
    #[command(after_help = "\
Lines typed are sent as messages. '/retry' resends messages that failed.
End input (Ctrl-D) to leave.")]
    Chat {
        /// Chat id
        chat: String,

        /// Handoff URL or token to seed the view from
        #[arg(long)]
        handoff: Option<String>,
    },

    /// Export or inspect handoff links
    #[command(subcommand)]
    Handoff(HandoffCommand),
}

#[derive(Subcommand)]
pub enum HandoffCommand {
    /// Fetch a chat and print a handoff URL carrying its messages
    Export {
        /// Chat id
        chat: String,

        /// Base URL the handoff link points at (defaults to the server url)
        #[arg(long)]
        base: Option<String>,
    },

    /// Decode a handoff URL or token without contacting the server
    Show {
        /// Handoff URL or bare token
        input: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
