// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic send pipeline.
//!
//! A send is visible immediately as a pending message in the store. The
//! pipeline remembers every send it has not yet reconciled, in creation
//! order, and pairs each with its server-confirmed counterpart:
//!
//! 1. by receipt id, once the transport has acknowledged the send;
//! 2. otherwise by sender and text, oldest pending first.
//!
//! Failed sends stay pending until the caller retries or discards them.

use std::collections::HashSet;
use std::sync::Arc;

use crate::clock::{Clock, MonotonicStamper};
use crate::error::{Error, Result, ValidationError};
use crate::model::{Message, Participant};
use crate::store::MessageStore;
use crate::transport::{OutgoingMessage, SendReceipt, TransportError};

/// Where a pending send is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    /// Dispatched, no answer yet.
    Sending,
    /// The transport reported an error.
    Failed,
    /// Accepted by the server, not yet seen in a fetch.
    Sent { message_id: String },
}

/// A locally authored message awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub state: SendState,
}

impl PendingSend {
    fn outgoing(&self) -> OutgoingMessage {
        OutgoingMessage {
            user_id: self.sender_id.clone(),
            user_name: self.sender_name.clone(),
            text: self.text.clone(),
        }
    }

    fn receipt_id(&self) -> Option<&str> {
        match &self.state {
            SendState::Sent { message_id } => Some(message_id),
            _ => None,
        }
    }
}

/// A pending message replaced by its confirmed counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub pending_id: String,
    pub message_id: String,
}

/// What [`SendPipeline::complete`] did with a transport answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Server accepted the send. `reconciled` is true if the confirmed copy
    /// was already in the store and replaced the pending echo.
    Confirmed { message_id: String, reconciled: bool },
    /// The send failed; the pending message stays in the store.
    Failed(TransportError),
    /// The pending send was discarded or reset before the answer arrived.
    Stale,
}

/// A send ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub pending_id: String,
    pub message: OutgoingMessage,
}

/// Tracks unreconciled sends in creation order.
pub struct SendPipeline {
    stamper: MonotonicStamper<Arc<dyn Clock>>,
    entries: Vec<PendingSend>,
}

impl SendPipeline {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        SendPipeline {
            stamper: MonotonicStamper::new(clock),
            entries: Vec::new(),
        }
    }

    /// Unreconciled sends, oldest first.
    pub fn entries(&self) -> &[PendingSend] {
        &self.entries
    }

    pub fn get(&self, pending_id: &str) -> Option<&PendingSend> {
        self.entries.iter().find(|e| e.id == pending_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates `text` and appends its pending echo to the store.
    ///
    /// Empty or whitespace-only text is rejected before the store is touched.
    /// Surrounding whitespace is trimmed from what is stored and sent.
    pub fn prepare(
        &mut self,
        store: &mut MessageStore,
        sender: &Participant,
        text: &str,
    ) -> std::result::Result<Dispatch, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let entry = PendingSend {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.display_name.clone(),
            text: text.to_string(),
            state: SendState::Sending,
        };
        store.append_pending(Message::pending(
            &entry.id,
            &entry.sender_id,
            &entry.sender_name,
            &entry.text,
            self.stamper.stamp(),
        ));

        let dispatch = Dispatch {
            pending_id: entry.id.clone(),
            message: entry.outgoing(),
        };
        self.entries.push(entry);
        Ok(dispatch)
    }

    /// Applies the transport's answer to a send.
    pub fn complete(
        &mut self,
        store: &mut MessageStore,
        pending_id: &str,
        result: std::result::Result<SendReceipt, TransportError>,
    ) -> SendOutcome {
        let Some(pos) = self.entries.iter().position(|e| e.id == pending_id) else {
            return SendOutcome::Stale;
        };

        match result {
            Ok(receipt) => {
                let reconciled = store.contains_confirmed(&receipt.message_id);
                if reconciled {
                    store.remove_pending(pending_id);
                    self.entries.remove(pos);
                } else {
                    self.entries[pos].state = SendState::Sent {
                        message_id: receipt.message_id.clone(),
                    };
                }
                SendOutcome::Confirmed {
                    message_id: receipt.message_id,
                    reconciled,
                }
            }
            Err(error) => {
                self.entries[pos].state = SendState::Failed;
                SendOutcome::Failed(error)
            }
        }
    }

    /// Pairs pending sends with confirmed messages after a fetch.
    ///
    /// `added` are the messages the fetch introduced, in display order. Each
    /// confirmed message is claimed by at most one pending send.
    pub fn reconcile(&mut self, store: &mut MessageStore, added: &[Message]) -> Vec<Reconciliation> {
        let mut matched: Vec<Reconciliation> = Vec::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        // Replaced in place by a confirmed message carrying the same id.
        for entry in &self.entries {
            if store.get(&entry.id).is_some_and(|m| !m.pending) {
                claimed.insert(entry.id.as_str());
                matched.push(Reconciliation {
                    pending_id: entry.id.clone(),
                    message_id: entry.id.clone(),
                });
            }
        }

        for entry in &self.entries {
            if let Some(message_id) = entry.receipt_id() {
                if store.contains_confirmed(message_id) && claimed.insert(message_id) {
                    matched.push(Reconciliation {
                        pending_id: entry.id.clone(),
                        message_id: message_id.to_string(),
                    });
                }
            }
        }

        // Receipt ids belong to their own sends even if not fetched yet.
        for entry in &self.entries {
            if let Some(message_id) = entry.receipt_id() {
                claimed.insert(message_id);
            }
        }

        for entry in &self.entries {
            if entry.receipt_id().is_some() || matched.iter().any(|r| r.pending_id == entry.id) {
                continue;
            }
            let candidate = added.iter().find(|m| {
                !claimed.contains(m.id.as_str())
                    && m.sender_id == entry.sender_id
                    && m.text == entry.text
            });
            if let Some(confirmed) = candidate {
                claimed.insert(confirmed.id.as_str());
                matched.push(Reconciliation {
                    pending_id: entry.id.clone(),
                    message_id: confirmed.id.clone(),
                });
            }
        }

        for reconciliation in &matched {
            store.remove_pending(&reconciliation.pending_id);
            self.entries.retain(|e| e.id != reconciliation.pending_id);
        }
        matched
    }

    /// Re-dispatches a failed send. Its pending message is left as is.
    pub fn retry(&mut self, pending_id: &str) -> Result<Dispatch> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == pending_id)
            .ok_or_else(|| Error::UnknownPending(pending_id.to_string()))?;
        if entry.state != SendState::Failed {
            return Err(Error::NotFailed(pending_id.to_string()));
        }
        entry.state = SendState::Sending;
        Ok(Dispatch {
            pending_id: entry.id.clone(),
            message: entry.outgoing(),
        })
    }

    /// Drops a pending send and removes its echo from the store.
    pub fn discard(&mut self, store: &mut MessageStore, pending_id: &str) -> Result<Message> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == pending_id)
            .ok_or_else(|| Error::UnknownPending(pending_id.to_string()))?;
        self.entries.remove(pos);
        store
            .remove_pending(pending_id)
            .ok_or_else(|| Error::UnknownPending(pending_id.to_string()))
    }

    /// Forgets every pending send. The store is left alone.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
