// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use pl_core::SyncEngine;

use super::open_engine;
use crate::cli::OutputFormat;
use crate::error::Result;

pub async fn run(name: &str, members: &[String], output: OutputFormat) -> Result<()> {
    let (engine, _config) = open_engine()?;
    let result = run_impl(&engine, name, members, output, &mut std::io::stdout()).await;
    engine.shutdown().await;
    result
}

pub(crate) async fn run_impl(
    engine: &SyncEngine,
    name: &str,
    members: &[String],
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let info = engine.create_conversation(name, members).await?;

    match output {
        OutputFormat::Text => {
            writeln!(out, "Created chat {}: {}", info.chat_id, info.chat_name)?;
            writeln!(out, "Members: {}", info.members.join(", "))?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "new_tests.rs"]
mod tests;
