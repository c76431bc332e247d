// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core data model: messages, participants and the chat session.
//!
//! A [`ChatSession`] is the unit of serialization and handoff. Its field names
//! are part of the handoff token format, so renames here are format changes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message, either confirmed by the server or pending locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned id, or a locally generated UUID while pending.
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_name: String,
    pub timestamp: DateTime<Utc>,
    /// True while the message is a local echo the server has not confirmed.
    pub pending: bool,
}

impl Message {
    /// Creates a server-confirmed message.
    pub fn confirmed(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Message {
            id: id.into(),
            text: text.into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            timestamp,
            pending: false,
        }
    }

    /// Creates a locally authored, unconfirmed message.
    pub fn pending(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Message {
            pending: true,
            ..Message::confirmed(id, sender_id, sender_name, text, timestamp)
        }
    }

    /// Returns true if `confirmed` could be the server copy of this message.
    ///
    /// Only sender and text are compared; which pending message a confirmed
    /// one belongs to is decided by the send pipeline.
    pub fn echoes(&self, confirmed: &Message) -> bool {
        self.sender_id == confirmed.sender_id && self.text == confirmed.text
    }

    /// Total display order: timestamp, then confirmed before pending, then id.
    pub fn display_cmp(&self, other: &Message) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.pending.cmp(&other.pending))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A conversation member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The full local view of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Messages in display order (see [`Message::display_cmp`]).
    pub messages: Vec<Message>,
    /// Participants keyed by id.
    pub participants: BTreeMap<String, Participant>,
}

impl ChatSession {
    /// Creates an empty session containing only the given participant.
    pub fn with_participant(participant: Participant) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(participant.id.clone(), participant);
        ChatSession {
            messages: Vec::new(),
            participants,
        }
    }

    /// Returns the number of pending messages.
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
