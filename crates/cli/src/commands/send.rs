// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::time::Duration;

use pl_core::{EngineEvent, SyncEngine, ValidationError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::{open_engine, timed_out};
use crate::error::Result;

pub async fn run(chat: &str, text: &str) -> Result<()> {
    validate(text)?;
    let (engine, config) = open_engine()?;
    let result = run_impl(
        &engine,
        chat,
        text,
        config.wait_timeout(),
        &mut std::io::stdout(),
    )
    .await;
    engine.shutdown().await;
    result
}

/// Rejects blank text before anything touches the network.
pub fn validate(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText.into());
    }
    Ok(())
}

pub(crate) async fn run_impl(
    engine: &SyncEngine,
    chat: &str,
    text: &str,
    limit: Duration,
    out: &mut impl Write,
) -> Result<()> {
    let mut events = engine.events();
    engine.attach(chat)?;
    let pending_id = engine.send(text).await?;

    let outcome = tokio::time::timeout(limit, confirmation(&mut events, &pending_id)).await;
    engine.detach()?;

    let message_id = outcome.map_err(|_| timed_out(limit))??;
    writeln!(out, "{}", message_id)?;
    Ok(())
}

/// Waits for the server id of `pending_id`, from its receipt or a fetch.
async fn confirmation(
    events: &mut broadcast::Receiver<EngineEvent>,
    pending_id: &str,
) -> Result<String> {
    loop {
        match events.recv().await {
            Ok(EngineEvent::SendConfirmed {
                pending_id: id,
                message_id,
            })
            | Ok(EngineEvent::Reconciled {
                pending_id: id,
                message_id,
            }) if id == pending_id => return Ok(message_id),
            Ok(EngineEvent::SendFailed {
                pending_id: id,
                error,
            }) if id == pending_id => return Err(error.into()),
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return Err(pl_core::Error::EngineClosed.into()),
        }
    }
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
