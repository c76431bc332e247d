// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The owner task behind [`SyncEngine`](crate::SyncEngine).
//!
//! A single task owns the store, the pipeline and the scheduler. It reacts to
//! three inboxes: commands from the facade, ticks from the scheduler's
//! ticker, and completions from spawned network calls. Nothing else mutates
//! engine state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::engine::{EngineEvent, EngineStatus, LifecycleEvent};
use crate::error::{Error, Result, ValidationError};
use crate::model::{ChatSession, Message, Participant};
use crate::pipeline::{Dispatch, SendOutcome, SendPipeline};
use crate::scheduler::{FetchTicket, PollScheduler};
use crate::store::MessageStore;
use crate::transport::{RemoteMessage, SendReceipt, Transport, TransportResult};

/// Requests from the facade.
pub(crate) enum Command {
    Attach(String),
    Detach,
    Lifecycle(LifecycleEvent),
    Send {
        text: String,
        reply: oneshot::Sender<Result<String>>,
    },
    Retry {
        pending_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Discard {
        pending_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Import {
        session: ChatSession,
        reply: oneshot::Sender<()>,
    },
}

/// Results of network calls, marshaled back onto the owner.
enum Completion {
    Fetched {
        ticket: FetchTicket,
        result: TransportResult<Vec<RemoteMessage>>,
    },
    Sent {
        pending_id: String,
        result: TransportResult<SendReceipt>,
    },
}

/// Receivers drained by [`OwnerTask::run`].
pub(crate) struct OwnerTask {
    owner: Owner,
    ticks: mpsc::UnboundedReceiver<u64>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl OwnerTask {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        identity: Participant,
        poll_interval: Duration,
        clock: Arc<dyn Clock>,
        session_tx: watch::Sender<Arc<ChatSession>>,
        status_tx: watch::Sender<EngineStatus>,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let owner = Owner {
            transport,
            store: MessageStore::new(identity.clone()),
            identity,
            pipeline: SendPipeline::new(clock),
            scheduler: PollScheduler::new(poll_interval),
            conversation: None,
            attached: false,
            tick_tx,
            completion_tx,
            session_tx,
            status_tx,
            events,
        };
        OwnerTask {
            owner,
            ticks,
            completions,
        }
    }

    /// Runs until the facade's command sender is dropped.
    pub(crate) async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let OwnerTask {
            mut owner,
            mut ticks,
            mut completions,
        } = self;

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => owner.handle_command(command),
                    None => break,
                },

                Some(completion) = completions.recv() => owner.handle_completion(completion),

                Some(generation) = ticks.recv() => owner.handle_tick(generation),
            }
            owner.publish_status();
        }

        owner.scheduler.stop();
        debug!("sync engine owner exited");
    }
}

struct Owner {
    transport: Arc<dyn Transport>,
    identity: Participant,
    store: MessageStore,
    pipeline: SendPipeline,
    scheduler: PollScheduler,
    /// Last conversation attached to. Kept across detach.
    conversation: Option<String>,
    attached: bool,
    tick_tx: mpsc::UnboundedSender<u64>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    session_tx: watch::Sender<Arc<ChatSession>>,
    status_tx: watch::Sender<EngineStatus>,
    events: broadcast::Sender<EngineEvent>,
}

impl Owner {
    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Attach(conversation) => self.attach(conversation),
            Command::Detach => self.detach(),
            Command::Lifecycle(event) => self.lifecycle(event),
            Command::Send { text, reply } => {
                let _ = reply.send(self.send(&text));
            }
            Command::Retry { pending_id, reply } => {
                let _ = reply.send(self.retry(&pending_id));
            }
            Command::Discard { pending_id, reply } => {
                let _ = reply.send(self.discard(&pending_id));
            }
            Command::Import { session, reply } => {
                self.import(session);
                let _ = reply.send(());
            }
        }
    }

    fn attach(&mut self, conversation: String) {
        if self.conversation.as_deref() == Some(conversation.as_str()) {
            if self.attached && self.scheduler.is_active() {
                debug!(%conversation, "already attached");
                return;
            }
        } else {
            self.scheduler.stop();
            if self.conversation.is_some() {
                self.store.reset();
                self.pipeline.clear();
                self.scheduler.reset();
                self.publish_session();
            }
            self.conversation = Some(conversation.clone());
        }

        self.attached = true;
        self.scheduler.start(self.tick_tx.clone());
        info!(%conversation, "attached");
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.scheduler.stop();
        info!(conversation = ?self.conversation, "detached");
    }

    fn lifecycle(&mut self, event: LifecycleEvent) {
        if !self.attached {
            debug!(?event, "lifecycle event ignored while detached");
            return;
        }
        match event {
            LifecycleEvent::Foreground => {
                self.scheduler.start(self.tick_tx.clone());
            }
            LifecycleEvent::Background => {
                self.scheduler.stop();
            }
        }
    }

    fn attached_conversation(&self) -> Result<String> {
        match (&self.conversation, self.attached) {
            (Some(conversation), true) => Ok(conversation.clone()),
            _ => Err(Error::NotAttached),
        }
    }

    fn send(&mut self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        let conversation = self.attached_conversation()?;
        let dispatch = self
            .pipeline
            .prepare(&mut self.store, &self.identity, text)?;
        let pending_id = dispatch.pending_id.clone();
        debug!(%pending_id, "pending message appended");

        self.publish_session();
        self.dispatch(conversation, dispatch);
        Ok(pending_id)
    }

    fn retry(&mut self, pending_id: &str) -> Result<()> {
        let conversation = self.attached_conversation()?;
        let dispatch = self.pipeline.retry(pending_id)?;
        debug!(%pending_id, "retrying send");
        self.dispatch(conversation, dispatch);
        Ok(())
    }

    fn discard(&mut self, pending_id: &str) -> Result<()> {
        self.pipeline.discard(&mut self.store, pending_id)?;
        debug!(%pending_id, "pending message discarded");
        self.publish_session();
        Ok(())
    }

    fn import(&mut self, session: ChatSession) {
        self.store.replace(session);
        self.pipeline.clear();
        self.scheduler.observe(self.store.len());
        info!(messages = self.store.len(), "session imported");
        self.publish_session();
    }

    fn dispatch(&self, conversation: String, dispatch: Dispatch) {
        let transport = Arc::clone(&self.transport);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = transport
                .send_message(&conversation, &dispatch.message)
                .await;
            let _ = completions.send(Completion::Sent {
                pending_id: dispatch.pending_id,
                result,
            });
        });
    }

    fn handle_tick(&mut self, generation: u64) {
        let Ok(conversation) = self.attached_conversation() else {
            return;
        };
        let Some(ticket) = self.scheduler.on_tick(generation) else {
            return;
        };
        self.fetch(conversation, ticket);
    }

    fn fetch(&self, conversation: String, ticket: FetchTicket) {
        debug!(%conversation, generation = ticket.generation(), "fetching messages");

        let transport = Arc::clone(&self.transport);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = transport.fetch_messages(&conversation).await;
            let _ = completions.send(Completion::Fetched { ticket, result });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched { ticket, result } => {
                if self.scheduler.finish_fetch(ticket) {
                    self.apply_fetch(result);
                }
                if let Some(ticket) = self.scheduler.take_deferred() {
                    match self.attached_conversation() {
                        Ok(conversation) => self.fetch(conversation, ticket),
                        Err(_) => {
                            self.scheduler.finish_fetch(ticket);
                        }
                    }
                }
            }
            Completion::Sent { pending_id, result } => self.apply_send(pending_id, result),
        }
    }

    fn apply_fetch(&mut self, result: TransportResult<Vec<RemoteMessage>>) {
        let batch = match result {
            Ok(batch) => batch,
            Err(error) => {
                if self.scheduler.record_failure() {
                    warn!(%error, "fetch failed");
                } else {
                    debug!(%error, "fetch failed again");
                }
                self.emit(EngineEvent::FetchFailed { error });
                return;
            }
        };

        let batch: Vec<Message> = batch.into_iter().map(Message::from).collect();
        let outcome = self.store.upsert_confirmed(batch);
        let reconciled = self.pipeline.reconcile(&mut self.store, &outcome.added);
        let report = self.scheduler.record_success(self.store.len());
        debug!(
            added = outcome.added.len(),
            reconciled = reconciled.len(),
            total = self.store.len(),
            "fetch applied"
        );

        if !outcome.added.is_empty() || !reconciled.is_empty() {
            self.publish_session();
        }
        for r in reconciled {
            self.emit(EngineEvent::Reconciled {
                pending_id: r.pending_id,
                message_id: r.message_id,
            });
        }
        if report.recovered {
            info!("fetch recovered");
            self.emit(EngineEvent::FetchRecovered);
        }
        if report.new_messages {
            self.emit(EngineEvent::NewMessages {
                added: outcome.added,
                total: self.store.len(),
            });
        }
    }

    fn apply_send(&mut self, pending_id: String, result: TransportResult<SendReceipt>) {
        match self.pipeline.complete(&mut self.store, &pending_id, result) {
            SendOutcome::Confirmed {
                message_id,
                reconciled,
            } => {
                debug!(%pending_id, %message_id, reconciled, "send confirmed");
                self.emit(EngineEvent::SendConfirmed {
                    pending_id: pending_id.clone(),
                    message_id: message_id.clone(),
                });
                if reconciled {
                    self.publish_session();
                    self.emit(EngineEvent::Reconciled {
                        pending_id,
                        message_id,
                    });
                }
            }
            SendOutcome::Failed(error) => {
                warn!(%pending_id, %error, "send failed");
                self.emit(EngineEvent::SendFailed { pending_id, error });
            }
            SendOutcome::Stale => {
                debug!(%pending_id, "answer for forgotten send dropped");
            }
        }
    }

    fn emit(&self, event: EngineEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    fn publish_session(&self) {
        self.session_tx.send_replace(Arc::new(self.store.snapshot()));
    }

    fn publish_status(&self) {
        let status = EngineStatus {
            attached: self.conversation.clone().filter(|_| self.attached),
            polling: self.scheduler.is_active(),
            in_flight: self.scheduler.in_flight(),
            last_fetch_failed: self.scheduler.last_fetch_failed(),
            last_observed_count: self.scheduler.last_observed_count(),
            fetches: self.scheduler.completed_fetches(),
            pending: self.pipeline.len(),
        };
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}
