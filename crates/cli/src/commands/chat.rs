// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use pl_core::{EngineEvent, SyncEngine};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::{handoff_token, open_engine};
use crate::display::format_message;
use crate::error::Result;

/// Input line that resends every failed message.
const RETRY_COMMAND: &str = "/retry";

pub async fn run(chat: &str, handoff: Option<&str>) -> Result<()> {
    let (engine, _config) = open_engine()?;
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let result = run_impl(&engine, chat, handoff, lines, &mut std::io::stdout()).await;
    engine.shutdown().await;
    result
}

pub(crate) async fn run_impl<R: AsyncBufRead + Unpin>(
    engine: &SyncEngine,
    chat: &str,
    handoff: Option<&str>,
    mut lines: Lines<R>,
    out: &mut impl Write,
) -> Result<()> {
    let mut events = engine.events();

    if let Some(handoff) = handoff {
        let token = handoff_token(handoff)?;
        match engine.import_handoff(&token).await {
            Ok(()) => {
                for message in engine.messages() {
                    writeln!(out, "{}", format_message(&message))?;
                }
            }
            Err(e) => eprintln!("warning: {}", e),
        }
    }

    engine.attach(chat)?;
    let mut failed: Vec<String> = Vec::new();
    let mut offline = false;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Ok(EngineEvent::NewMessages { added, .. }) => {
                    for message in added.iter().filter(|m| m.sender_id != engine.identity().id) {
                        writeln!(out, "{}", format_message(message))?;
                    }
                    out.flush()?;
                }
                Ok(EngineEvent::SendFailed { pending_id, error }) => {
                    eprintln!("warning: message not sent: {}\n  hint: type {} to resend", error, RETRY_COMMAND);
                    failed.push(pending_id);
                }
                Ok(EngineEvent::FetchFailed { error }) => {
                    if !offline {
                        eprintln!("warning: cannot reach server: {}", error);
                        offline = true;
                    }
                }
                Ok(EngineEvent::FetchRecovered) => {
                    eprintln!("reconnected");
                    offline = false;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "event receiver lagged"),
                Err(RecvError::Closed) => break,
            },

            line = lines.next_line() => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == RETRY_COMMAND {
                        for pending_id in failed.drain(..) {
                            if let Err(e) = engine.retry(&pending_id).await {
                                debug!(%pending_id, error = %e, "nothing to retry");
                            }
                        }
                    } else {
                        engine.send(line).await?;
                    }
                }
                None => break,
            },
        }
    }

    engine.detach()?;
    Ok(())
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
