// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! plrs - A polling chat client library.
//!
//! This crate provides the command layer of the `parley` CLI. Every command
//! that talks to a server drives a [`pl_core::SyncEngine`] over HTTP; the
//! handoff `show` command works offline.
//!
//! # Main Components
//!
//! - [`Config`] - Project configuration (server, identity, polling)
//! - [`Cli`] - The clap command-line definition
//! - [`Error`] - Error types for all operations
//!
//! # Initialization
//!
//! ```rust,ignore
//! use plrs::{init_parley_dir, find_parley_dir, Config};
//!
//! let config = Config::new("http://127.0.0.1:8000", "u1", "Alice")?;
//! let parley_dir = init_parley_dir(Path::new("."), &config)?;
//!
//! // Later, from anywhere below the project root
//! let config = Config::load(&find_parley_dir()?)?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;

pub use cli::{Cli, Command, HandoffCommand, OutputFormat};
pub use config::{find_parley_dir, init_parley_dir, Config};
pub use error::{Error, Result};

use std::future::Future;

/// Environment variable holding the log filter, e.g. `PARLEY_LOG=debug`.
pub const LOG_ENV: &str = "PARLEY_LOG";

/// Installs the stderr log subscriber. Defaults to warnings only.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            Error::InvalidInput(format!("cannot change to directory '{}': {}", dir, e))
        })?;
    }

    match cli.command {
        Command::Init {
            server,
            user,
            name,
            interval_ms,
        } => commands::init::run(&server, &user, &name, interval_ms),
        Command::New {
            name,
            members,
            output,
        } => block_on(commands::new::run(&name, &members, output)),
        Command::Invite { chat, user } => block_on(commands::invite::run(&chat, &user)),
        Command::Send { chat, text } => block_on(commands::send::run(&chat, &text)),
        Command::Log { chat, output } => block_on(commands::log::run(&chat, output)),
        Command::Chat { chat, handoff } => {
            block_on(commands::chat::run(&chat, handoff.as_deref()))
        }
        Command::Handoff(cmd) => match cmd {
            HandoffCommand::Export { chat, base } => {
                block_on(commands::handoff::export(&chat, base.as_deref()))
            }
            HandoffCommand::Show { input, output } => commands::handoff::show(&input, output),
        },
    }
}

/// Runs a networked command on a fresh multi-threaded runtime.
fn block_on<F: Future<Output = Result<()>>>(command: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(command)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
