// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use crate::config::{init_parley_dir, Config};
use crate::error::Result;

pub fn run(server: &str, user: &str, name: &str, interval_ms: Option<u64>) -> Result<()> {
    let target_path = std::env::current_dir()?;
    run_impl(
        &target_path,
        server,
        user,
        name,
        interval_ms,
        &mut std::io::stdout(),
    )
}

pub(crate) fn run_impl(
    target_path: &Path,
    server: &str,
    user: &str,
    name: &str,
    interval_ms: Option<u64>,
    out: &mut impl Write,
) -> Result<()> {
    let mut config = Config::new(server, user, name)?;
    if let Some(interval_ms) = interval_ms {
        config.polling.interval_ms = interval_ms;
    }

    let parley_dir = init_parley_dir(target_path, &config)?;

    writeln!(out, "Initialized parley at {}", parley_dir.display())?;
    writeln!(out, "Server: {}", config.server.url)?;
    writeln!(
        out,
        "Identity: {} ({})",
        config.identity.display_name, config.identity.user_id
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
