// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod chat;
pub mod handoff;
pub mod init;
pub mod invite;
pub mod log;
pub mod new;
pub mod send;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::time::Duration;

use pl_core::{parse_handoff, EngineEvent, HttpTransport, SyncEngine};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::config::{find_parley_dir, Config};
use crate::error::{Error, Result};

/// Helper to open a sync engine against the configured server.
pub fn open_engine() -> Result<(SyncEngine, Config)> {
    let parley_dir = find_parley_dir()?;
    let config = Config::load(&parley_dir)?;
    let transport = HttpTransport::new(config.http_config())?;
    let engine = SyncEngine::new(transport, config.participant(), config.engine_config());
    Ok((engine, config))
}

/// Waits until the attached engine has applied its first fetch.
///
/// `events` must have been subscribed before attaching so that a failed
/// first fetch can be reported with its cause.
pub async fn first_fetch(
    engine: &SyncEngine,
    events: &mut broadcast::Receiver<EngineEvent>,
    limit: Duration,
) -> Result<()> {
    let mut status = engine.watch_status();
    let failed = match tokio::time::timeout(limit, status.wait_for(|s| s.fetches > 0)).await {
        Ok(Ok(status)) => status.last_fetch_failed,
        Ok(Err(_)) => return Err(pl_core::Error::EngineClosed.into()),
        Err(_) => return Err(timed_out(limit)),
    };
    if !failed {
        return Ok(());
    }

    loop {
        match events.try_recv() {
            Ok(EngineEvent::FetchFailed { error }) => return Err(error.into()),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    Err(timed_out(limit))
}

/// Extracts the session token from a handoff URL, or takes `input` as a bare token.
pub fn handoff_token(input: &str) -> Result<String> {
    let input = input.trim();
    if input.contains("://") || input.contains('?') {
        return parse_handoff(input)
            .map(|handoff| handoff.token)
            .ok_or_else(|| Error::MissingToken(input.to_string()));
    }
    Ok(input.to_string())
}

pub(crate) fn timed_out(limit: Duration) -> Error {
    Error::Timeout(format!(
        "no answer from server within {}s",
        limit.as_secs_f64()
    ))
}
