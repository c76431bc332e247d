// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The message store: the deduplicated, ordered log of one conversation.
//!
//! The store is the single source of truth for message membership and order.
//! It is written only by the sync engine's owner task, through
//! [`upsert_confirmed`](MessageStore::upsert_confirmed),
//! [`append_pending`](MessageStore::append_pending),
//! [`remove_pending`](MessageStore::remove_pending) and
//! [`replace`](MessageStore::replace).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{ChatSession, Message, Participant};

/// Result of merging a fetched batch into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Messages that were not in the store before the merge, in display order.
    pub added: Vec<Message>,
    /// Total number of messages in the store after the merge.
    pub new_count: usize,
}

/// Ordered, id-unique message log plus the participant set.
#[derive(Debug, Clone)]
pub struct MessageStore {
    local: Participant,
    messages: Vec<Message>,
    participants: BTreeMap<String, Participant>,
}

impl MessageStore {
    /// Creates an empty store. The local participant is always present.
    pub fn new(local: Participant) -> Self {
        let session = ChatSession::with_participant(local.clone());
        MessageStore {
            local,
            messages: session.messages,
            participants: session.participants,
        }
    }

    /// The local user this store was created for.
    pub fn local(&self) -> &Participant {
        &self.local
    }

    /// Messages in display order, except for pending messages appended
    /// since the last merge, which sit at the tail.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn participants(&self) -> &BTreeMap<String, Participant> {
        &self.participants
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns true if a confirmed message with this id is present.
    pub fn contains_confirmed(&self, id: &str) -> bool {
        self.get(id).is_some_and(|m| !m.pending)
    }

    /// Merges a batch of server-confirmed messages.
    ///
    /// Messages whose id is already present are left untouched, except that a
    /// pending entry is replaced when the incoming message carries its id and
    /// echoes its sender and text. Everything else is inserted. The log is
    /// re-sorted afterwards, and the batch may arrive in any order.
    pub fn upsert_confirmed(&mut self, batch: Vec<Message>) -> UpsertOutcome {
        let mut index: HashMap<String, usize> = self
            .messages
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        let mut seen = HashSet::new();
        let mut added = Vec::new();

        for mut incoming in batch {
            incoming.pending = false;
            if !seen.insert(incoming.id.clone()) {
                continue;
            }
            self.note_sender(&incoming);

            match index.get(&incoming.id) {
                Some(&i) => {
                    let existing = &mut self.messages[i];
                    if existing.pending && existing.echoes(&incoming) {
                        *existing = incoming;
                    }
                }
                None => {
                    index.insert(incoming.id.clone(), self.messages.len());
                    added.push(incoming.clone());
                    self.messages.push(incoming);
                }
            }
        }

        self.sort();
        added.sort_by(Message::display_cmp);

        UpsertOutcome {
            added,
            new_count: self.messages.len(),
        }
    }

    /// Appends a locally authored message at the tail.
    ///
    /// The tail position is transient: the message is stamped by the local
    /// clock, and if the server clock runs ahead it belongs before some
    /// confirmed messages. The next [`upsert_confirmed`](Self::upsert_confirmed)
    /// re-sorts it into display order.
    ///
    /// Returns false (and stores nothing) if the id is already taken.
    pub fn append_pending(&mut self, mut message: Message) -> bool {
        if self.get(&message.id).is_some() {
            return false;
        }
        message.pending = true;
        self.messages.push(message);
        true
    }

    /// Removes a pending message. Confirmed messages are never removed.
    pub fn remove_pending(&mut self, id: &str) -> Option<Message> {
        let pos = self.messages.iter().position(|m| m.id == id && m.pending)?;
        Some(self.messages.remove(pos))
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> ChatSession {
        ChatSession {
            messages: self.messages.clone(),
            participants: self.participants.clone(),
        }
    }

    /// Replaces the whole state with an imported session.
    ///
    /// Pending messages are discarded, both the store's own and any carried by
    /// the session: only confirmed history is authoritative across devices.
    /// Duplicate ids keep their first occurrence.
    pub fn replace(&mut self, session: ChatSession) {
        let mut seen = HashSet::new();
        self.messages = session
            .messages
            .into_iter()
            .filter(|m| !m.pending && seen.insert(m.id.clone()))
            .collect();
        self.participants = session.participants;
        self.participants
            .entry(self.local.id.clone())
            .or_insert_with(|| self.local.clone());
        self.sort();
    }

    /// Drops every message and participant except the local user.
    pub fn reset(&mut self) {
        *self = MessageStore::new(self.local.clone());
    }

    fn note_sender(&mut self, message: &Message) {
        let participant = self
            .participants
            .entry(message.sender_id.clone())
            .or_insert_with(|| Participant::new(&message.sender_id, &message.sender_name));
        if participant.display_name != message.sender_name && !message.sender_name.is_empty() {
            participant.display_name = message.sender_name.clone();
        }
    }

    fn sort(&mut self) {
        self.messages.sort_by(Message::display_cmp);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
