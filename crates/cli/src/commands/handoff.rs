// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::time::Duration;

use pl_core::{decode, handoff_url, SyncEngine};

use super::{first_fetch, handoff_token, open_engine};
use crate::cli::OutputFormat;
use crate::display::write_messages;
use crate::error::{Error, Result};

pub async fn export(chat: &str, base: Option<&str>) -> Result<()> {
    let (engine, config) = open_engine()?;
    let base = base.unwrap_or(&config.server.url);
    let result = export_impl(
        &engine,
        chat,
        base,
        config.wait_timeout(),
        &mut std::io::stdout(),
    )
    .await;
    engine.shutdown().await;
    result
}

pub(crate) async fn export_impl(
    engine: &SyncEngine,
    chat: &str,
    base: &str,
    limit: Duration,
    out: &mut impl Write,
) -> Result<()> {
    let mut events = engine.events();
    engine.attach(chat)?;
    let fetched = first_fetch(engine, &mut events, limit).await;
    engine.detach()?;
    fetched?;

    let token = engine.export_handoff();
    let url = handoff_url(base, chat, &token)
        .map_err(|e| Error::InvalidInput(format!("invalid handoff base url '{}': {}", base, e)))?;
    writeln!(out, "{}", url)?;
    Ok(())
}

pub fn show(input: &str, output: OutputFormat) -> Result<()> {
    show_impl(input, output, &mut std::io::stdout())
}

/// Decodes a handoff without any network access.
pub(crate) fn show_impl(input: &str, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let token = handoff_token(input)?;
    let session = decode(&token)?;

    if output == OutputFormat::Text {
        let mut names: Vec<&str> = session
            .participants
            .values()
            .map(|p| p.display_name.as_str())
            .collect();
        names.sort_unstable();
        writeln!(out, "Participants: {}", names.join(", "))?;
    }
    write_messages(out, &session.messages, output)
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
