// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine facade.
//!
//! [`SyncEngine`] is a cheap handle onto an owner task that holds the message
//! store, the send pipeline and the polling scheduler. Every mutation is a
//! command processed by that task; network calls run on spawned tasks and
//! report back to it. Readers observe state through a `watch` snapshot and an
//! event broadcast, so no lock is ever shared with the owner.
//!
//! ```ignore
//! let engine = SyncEngine::new(transport, identity, EngineConfig::default());
//! engine.attach("chat-1")?;
//! let pending_id = engine.send("hi").await?;
//! assert!(engine.messages().iter().any(|m| m.id == pending_id));
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::codec::{self, DecodeError, DEFAULT_MAX_TOKEN_BYTES};
use crate::error::{Error, Result};
use crate::model::{ChatSession, Message, Participant};
use crate::owner::{Command, OwnerTask};
use crate::transport::{ChatInfo, Transport, TransportError};

/// Tuning knobs for a [`SyncEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fixed delay between fetches while polling.
    pub poll_interval: Duration,
    /// Upper bound on exported handoff tokens.
    pub max_token_bytes: usize,
    /// Capacity of the event broadcast. Slow subscribers lag past this.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            poll_interval: Duration::from_secs(2),
            max_token_bytes: DEFAULT_MAX_TOKEN_BYTES,
            event_capacity: 256,
        }
    }
}

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A fetch grew the store. `added` are the messages it introduced.
    NewMessages { added: Vec<Message>, total: usize },
    /// A fetch failed. Polling continues on the same cadence.
    FetchFailed { error: TransportError },
    /// A fetch succeeded after one or more failures.
    FetchRecovered,
    /// The server accepted a send.
    SendConfirmed {
        pending_id: String,
        message_id: String,
    },
    /// A send failed. The pending message stays until retried or discarded.
    SendFailed {
        pending_id: String,
        error: TransportError,
    },
    /// A pending message was replaced by its confirmed counterpart.
    Reconciled {
        pending_id: String,
        message_id: String,
    },
}

/// Point-in-time view of the engine's lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatus {
    /// Conversation currently attached, if any.
    pub attached: Option<String>,
    pub polling: bool,
    pub in_flight: bool,
    pub last_fetch_failed: bool,
    pub last_observed_count: usize,
    /// Fetch results applied since the conversation was attached.
    pub fetches: u64,
    /// Sends not yet reconciled.
    pub pending: usize,
}

/// Application lifecycle signal, e.g. a window gaining or losing focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Foreground,
    Background,
}

/// Handle onto a running sync engine.
///
/// Must be created inside a tokio runtime. Dropping the handle stops the
/// owner task and its ticker.
pub struct SyncEngine {
    identity: Participant,
    config: EngineConfig,
    transport: Arc<dyn Transport>,
    commands: mpsc::UnboundedSender<Command>,
    session: watch::Receiver<Arc<ChatSession>>,
    status: watch::Receiver<EngineStatus>,
    events: broadcast::Sender<EngineEvent>,
    owner: JoinHandle<()>,
}

impl SyncEngine {
    /// Creates an engine for `identity`, detached, with an empty store.
    pub fn new<T: Transport>(transport: T, identity: Participant, config: EngineConfig) -> Self {
        Self::with_clock(transport, identity, config, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new), stamping pending messages from `clock`.
    pub fn with_clock<T: Transport>(
        transport: T,
        identity: Participant,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (session_tx, session) =
            watch::channel(Arc::new(ChatSession::with_participant(identity.clone())));
        let (status_tx, status) = watch::channel(EngineStatus::default());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let task = OwnerTask::new(
            Arc::clone(&transport),
            identity.clone(),
            config.poll_interval,
            clock,
            session_tx,
            status_tx,
            events.clone(),
        );
        let owner = tokio::spawn(task.run(command_rx));

        SyncEngine {
            identity,
            config,
            transport,
            commands,
            session,
            status,
            events,
            owner,
        }
    }

    /// The local user.
    pub fn identity(&self) -> &Participant {
        &self.identity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts polling `conversation_id`.
    ///
    /// Attaching to a conversation other than the last one clears the store.
    /// Attaching to the current one again is a no-op.
    pub fn attach(&self, conversation_id: &str) -> Result<()> {
        self.command(Command::Attach(conversation_id.to_string()))
    }

    /// Stops polling. Safe to call repeatedly or before any attach.
    ///
    /// A fetch already in flight is not cancelled, but its result is dropped.
    pub fn detach(&self) -> Result<()> {
        self.command(Command::Detach)
    }

    /// Forwards an application lifecycle signal. Ignored while detached.
    pub fn lifecycle(&self, event: LifecycleEvent) -> Result<()> {
        self.command(Command::Lifecycle(event))
    }

    /// Sends `text` as the local user and returns the pending message id.
    ///
    /// The pending message is in [`messages`](Self::messages) by the time
    /// this returns; the network call continues in the background and its
    /// outcome arrives as an [`EngineEvent`]. Blank text fails with
    /// [`Error::Validation`] before anything else happens.
    pub async fn send(&self, text: &str) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Send {
            text: text.to_string(),
            reply,
        })?;
        rx.await.map_err(|_| Error::EngineClosed)?
    }

    /// Re-dispatches a failed send.
    pub async fn retry(&self, pending_id: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Retry {
            pending_id: pending_id.to_string(),
            reply,
        })?;
        rx.await.map_err(|_| Error::EngineClosed)?
    }

    /// Gives up on a send and removes its pending message.
    pub async fn discard(&self, pending_id: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Discard {
            pending_id: pending_id.to_string(),
            reply,
        })?;
        rx.await.map_err(|_| Error::EngineClosed)?
    }

    /// Current messages in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.session.borrow().messages.clone()
    }

    pub fn participant_count(&self) -> usize {
        self.session.borrow().participants.len()
    }

    /// Current full session.
    pub fn session(&self) -> Arc<ChatSession> {
        Arc::clone(&self.session.borrow())
    }

    /// Receiver that sees a new snapshot after every store mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChatSession>> {
        self.session.clone()
    }

    /// Receiver for engine events emitted from now on.
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }

    /// Receiver that sees every status change.
    pub fn watch_status(&self) -> watch::Receiver<EngineStatus> {
        self.status.clone()
    }

    /// Encodes the confirmed history into a handoff token.
    ///
    /// Pending messages are left out; the importing side would drop them.
    pub fn export_handoff(&self) -> String {
        let mut session = (**self.session.borrow()).clone();
        session.messages.retain(|m| !m.pending);
        codec::encode_bounded(&session, self.config.max_token_bytes)
    }

    /// Replaces the store with the session in `token`.
    ///
    /// A token that does not decode leaves the engine with a fresh, empty
    /// session and returns the reason. Polling is not affected either way.
    pub async fn import_handoff(&self, token: &str) -> std::result::Result<(), DecodeError> {
        let (session, outcome) = match codec::decode(token) {
            Ok(session) => (session, Ok(())),
            Err(e) => {
                warn!(error = %e, "handoff token rejected, starting fresh");
                (ChatSession::default(), Err(e))
            }
        };
        let (reply, rx) = oneshot::channel();
        if self.command(Command::Import { session, reply }).is_ok() {
            let _ = rx.await;
        }
        outcome
    }

    /// Creates a conversation containing the local user and `members`.
    pub async fn create_conversation(&self, name: &str, members: &[String]) -> Result<ChatInfo> {
        let mut ids = vec![self.identity.id.clone()];
        ids.extend(members.iter().filter(|m| **m != self.identity.id).cloned());
        Ok(self.transport.create_chat(name, &ids).await?)
    }

    /// Adds `user_id` to `conversation_id`.
    pub async fn add_member(&self, conversation_id: &str, user_id: &str) -> Result<()> {
        Ok(self.transport.add_member(conversation_id, user_id).await?)
    }

    /// Stops the owner task and waits for it to exit.
    pub async fn shutdown(self) {
        let SyncEngine {
            commands, owner, ..
        } = self;
        drop(commands);
        let _ = owner.await;
    }

    fn command(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::EngineClosed)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
