// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use pl_core::SyncEngine;

use super::open_engine;
use crate::error::Result;

pub async fn run(chat: &str, user: &str) -> Result<()> {
    let (engine, _config) = open_engine()?;
    let result = run_impl(&engine, chat, user, &mut std::io::stdout()).await;
    engine.shutdown().await;
    result
}

pub(crate) async fn run_impl(
    engine: &SyncEngine,
    chat: &str,
    user: &str,
    out: &mut impl Write,
) -> Result<()> {
    engine.add_member(chat, user).await?;
    writeln!(out, "Added {} to {}", user, chat)?;
    Ok(())
}

#[cfg(test)]
#[path = "invite_tests.rs"]
mod tests;
