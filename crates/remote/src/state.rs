// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Holds every chat in memory behind a single lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use pl_core::{ChatInfo, OutgoingMessage, RemoteMessage};

/// Errors surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Chat not found")]
    ChatNotFound(String),

    #[error("Message text cannot be empty")]
    EmptyText,

    #[error("Chat name cannot be empty")]
    EmptyName,
}

/// Shared server state containing every chat.
#[derive(Clone, Default)]
pub struct ServerState {
    inner: Arc<RwLock<HashMap<String, Chat>>>,
}

struct Chat {
    name: String,
    members: Vec<String>,
    created_at: chrono::DateTime<Utc>,
    messages: Vec<RemoteMessage>,
}

impl Chat {
    fn info(&self, chat_id: &str) -> ChatInfo {
        ChatInfo {
            chat_id: chat_id.to_string(),
            chat_name: self.name.clone(),
            members: self.members.clone(),
            created_at: self.created_at,
            message_count: self.messages.len() as u64,
        }
    }

    fn add_member(&mut self, user_id: &str) -> bool {
        if self.members.iter().any(|m| m == user_id) {
            return false;
        }
        self.members.push(user_id.to_string());
        true
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chat. Member ids are de-duplicated, first occurrence wins.
    pub async fn create_chat(&self, name: &str, user_ids: &[String]) -> Result<ChatInfo, StateError> {
        if name.trim().is_empty() {
            return Err(StateError::EmptyName);
        }
        let chat_id = uuid::Uuid::new_v4().to_string();
        let mut chat = Chat {
            name: name.to_string(),
            members: Vec::new(),
            created_at: Utc::now(),
            messages: Vec::new(),
        };
        for user_id in user_ids {
            chat.add_member(user_id);
        }
        let info = chat.info(&chat_id);
        self.inner.write().await.insert(chat_id, chat);
        Ok(info)
    }

    /// Adds a member. Returns false if they were already in the chat.
    pub async fn add_member(&self, chat_id: &str, user_id: &str) -> Result<bool, StateError> {
        let mut chats = self.inner.write().await;
        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| StateError::ChatNotFound(chat_id.to_string()))?;
        Ok(chat.add_member(user_id))
    }

    /// Appends a message with a fresh server id and timestamp.
    pub async fn post_message(
        &self,
        chat_id: &str,
        message: OutgoingMessage,
    ) -> Result<String, StateError> {
        if message.text.trim().is_empty() {
            return Err(StateError::EmptyText);
        }
        let mut chats = self.inner.write().await;
        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| StateError::ChatNotFound(chat_id.to_string()))?;

        let message_id = uuid::Uuid::new_v4().to_string();
        chat.messages.push(RemoteMessage {
            message_id: message_id.clone(),
            user_id: message.user_id,
            user_name: message.user_name,
            text: message.text,
            timestamp: Utc::now(),
        });
        Ok(message_id)
    }

    /// Lists messages ordered by timestamp, then id.
    pub async fn messages(&self, chat_id: &str) -> Result<Vec<RemoteMessage>, StateError> {
        let chats = self.inner.read().await;
        let chat = chats
            .get(chat_id)
            .ok_or_else(|| StateError::ChatNotFound(chat_id.to_string()))?;
        let mut messages = chat.messages.clone();
        messages.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });
        Ok(messages)
    }

    pub async fn chat(&self, chat_id: &str) -> Result<ChatInfo, StateError> {
        let chats = self.inner.read().await;
        chats
            .get(chat_id)
            .map(|chat| chat.info(chat_id))
            .ok_or_else(|| StateError::ChatNotFound(chat_id.to_string()))
    }

    pub async fn chat_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
