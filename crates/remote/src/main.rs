// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pl-remote: In-memory reference chat server for parley.
//!
//! Serves the REST contract the parley clients poll against. Chats and
//! messages live in memory only and are gone when the process exits.

mod server;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// pl-remote: parley reference chat server
#[derive(Parser, Debug)]
#[command(name = "pl-remote")]
#[command(about = "In-memory reference chat server for parley clients")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pl-remote server");
    info!("  Bind address: {}", args.bind);

    let state = state::ServerState::new();
    server::run(args.bind, state).await?;

    Ok(())
}
