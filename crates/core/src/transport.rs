// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the remote chat log.
//!
//! Provides a trait-based transport layer that enables:
//! - A real HTTP transport for production (see [`crate::http`])
//! - Scripted transports for unit testing
//!
//! All operations are plain request/response calls. The sync engine only
//! distinguishes success from failure; the error variants exist for logs.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Message;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached (connect failure, timeout, reset).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A chat as created on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    pub chat_id: String,
    pub chat_name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u64,
}

/// Body of a send request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub user_id: String,
    pub user_name: String,
    pub text: String,
}

/// Server acknowledgement of a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: String,
}

/// Body of a create-chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub chat_name: String,
    pub user_ids: Vec<String>,
}

/// Body of an add-member request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
}

/// Response body of a message listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<RemoteMessage>,
}

/// A message as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub message_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<RemoteMessage> for Message {
    fn from(remote: RemoteMessage) -> Self {
        Message::confirmed(
            remote.message_id,
            remote.user_id,
            remote.user_name,
            remote.text,
            remote.timestamp,
        )
    }
}

/// Parses an ISO-8601 timestamp. Timestamps without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// The remote chat service the engine synchronizes against.
///
/// Implementations must be cheap to share: the engine wraps the transport in
/// an `Arc` and issues calls from spawned tasks.
pub trait Transport: Send + Sync + 'static {
    /// Create a chat with the given members.
    fn create_chat(&self, name: &str, participant_ids: &[String]) -> TransportFuture<'_, ChatInfo>;

    /// Add a member to an existing chat.
    fn add_member(&self, chat_id: &str, user_id: &str) -> TransportFuture<'_, ()>;

    /// Append a message to the chat's log.
    fn send_message(
        &self,
        chat_id: &str,
        message: &OutgoingMessage,
    ) -> TransportFuture<'_, SendReceipt>;

    /// List the chat's full log.
    fn fetch_messages(&self, chat_id: &str) -> TransportFuture<'_, Vec<RemoteMessage>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn create_chat(&self, name: &str, participant_ids: &[String]) -> TransportFuture<'_, ChatInfo> {
        (**self).create_chat(name, participant_ids)
    }

    fn add_member(&self, chat_id: &str, user_id: &str) -> TransportFuture<'_, ()> {
        (**self).add_member(chat_id, user_id)
    }

    fn send_message(
        &self,
        chat_id: &str,
        message: &OutgoingMessage,
    ) -> TransportFuture<'_, SendReceipt> {
        (**self).send_message(chat_id, message)
    }

    fn fetch_messages(&self, chat_id: &str) -> TransportFuture<'_, Vec<RemoteMessage>> {
        (**self).fetch_messages(chat_id)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
