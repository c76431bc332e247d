// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::time::Duration;

use pl_core::SyncEngine;

use super::{first_fetch, open_engine};
use crate::cli::OutputFormat;
use crate::display::write_messages;
use crate::error::Result;

pub async fn run(chat: &str, output: OutputFormat) -> Result<()> {
    let (engine, config) = open_engine()?;
    let result = run_impl(
        &engine,
        chat,
        output,
        config.wait_timeout(),
        &mut std::io::stdout(),
    )
    .await;
    engine.shutdown().await;
    result
}

pub(crate) async fn run_impl(
    engine: &SyncEngine,
    chat: &str,
    output: OutputFormat,
    limit: Duration,
    out: &mut impl Write,
) -> Result<()> {
    let mut events = engine.events();
    engine.attach(chat)?;
    let fetched = first_fetch(engine, &mut events, limit).await;
    engine.detach()?;
    fetched?;

    write_messages(out, &engine.messages(), output)
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
