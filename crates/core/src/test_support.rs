// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared builders and a scripted transport for unit tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::model::{Message, Participant};
use crate::transport::{
    ChatInfo, OutgoingMessage, RemoteMessage, SendReceipt, Transport, TransportError,
    TransportFuture,
};

/// Seconds since the epoch as a UTC timestamp.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Display name used by the builders for a sender id.
pub fn name_for(sender_id: &str) -> &'static str {
    match sender_id {
        "u1" => "Alice",
        "u2" => "Bob",
        "u3" => "Carol",
        _ => "Someone",
    }
}

pub fn alice() -> Participant {
    Participant::new("u1", "Alice")
}

pub fn confirmed(id: &str, sender_id: &str, text: &str, secs: i64) -> Message {
    Message::confirmed(id, sender_id, name_for(sender_id), text, ts(secs))
}

pub fn pending(id: &str, sender_id: &str, text: &str, secs: i64) -> Message {
    Message::pending(id, sender_id, name_for(sender_id), text, ts(secs))
}

pub fn remote(id: &str, sender_id: &str, text: &str, secs: i64) -> RemoteMessage {
    RemoteMessage {
        message_id: id.to_string(),
        user_id: sender_id.to_string(),
        user_name: name_for(sender_id).to_string(),
        text: text.to_string(),
        timestamp: ts(secs),
    }
}

/// Transport double backed by an in-memory remote log.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    log: Mutex<Vec<RemoteMessage>>,
    sent: Mutex<Vec<(String, OutgoingMessage)>>,
    members: Mutex<Vec<(String, String)>>,
    fetch_calls: AtomicUsize,
    send_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_send: AtomicBool,
    /// When true, accepted sends are appended to the remote log.
    echo_sends: AtomicBool,
    next_id: AtomicUsize,
    fetch_gate: Mutex<Option<Arc<Semaphore>>>,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
    fetch_responses: Mutex<VecDeque<Vec<RemoteMessage>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose accepted sends show up in later fetches.
    pub fn echoing() -> Self {
        let mock = Self::new();
        mock.inner.echo_sends.store(true, Ordering::SeqCst);
        mock
    }

    /// Appends a message to the remote log.
    pub fn push_remote(&self, message: RemoteMessage) {
        self.inner.log.lock().unwrap().push(message);
    }

    /// Queues a one-off fetch response that bypasses the remote log.
    pub fn queue_fetch_response(&self, messages: Vec<RemoteMessage>) {
        self.inner
            .fetch_responses
            .lock()
            .unwrap()
            .push_back(messages);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.inner.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.inner.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Makes every fetch wait for a permit on the returned semaphore.
    pub fn gate_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.inner.fetch_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Makes every send wait for a permit on the returned semaphore.
    pub fn gate_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.inner.send_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.inner.send_calls.load(Ordering::SeqCst)
    }

    /// Every accepted or attempted send, as (chat_id, message).
    pub fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.inner.sent.lock().unwrap().clone()
    }

    pub fn members(&self) -> Vec<(String, String)> {
        self.inner.members.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn create_chat(&self, name: &str, participant_ids: &[String]) -> TransportFuture<'_, ChatInfo> {
        let info = ChatInfo {
            chat_id: format!("chat-{}", name),
            chat_name: name.to_string(),
            members: participant_ids.to_vec(),
            created_at: ts(0),
            message_count: 0,
        };
        Box::pin(async move { Ok(info) })
    }

    fn add_member(&self, chat_id: &str, user_id: &str) -> TransportFuture<'_, ()> {
        let entry = (chat_id.to_string(), user_id.to_string());
        Box::pin(async move {
            self.inner.members.lock().unwrap().push(entry);
            Ok(())
        })
    }

    fn send_message(
        &self,
        chat_id: &str,
        message: &OutgoingMessage,
    ) -> TransportFuture<'_, SendReceipt> {
        let chat_id = chat_id.to_string();
        let message = message.clone();
        Box::pin(async move {
            self.inner.send_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.inner.send_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            self.inner
                .sent
                .lock()
                .unwrap()
                .push((chat_id, message.clone()));
            if self.inner.fail_send.load(Ordering::SeqCst) {
                return Err(TransportError::Unreachable("mock send failure".into()));
            }
            let n = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let message_id = format!("s{}", n);
            if self.inner.echo_sends.load(Ordering::SeqCst) {
                let secs = 1_000 + n as i64;
                self.inner.log.lock().unwrap().push(RemoteMessage {
                    message_id: message_id.clone(),
                    user_id: message.user_id,
                    user_name: message.user_name,
                    text: message.text,
                    timestamp: ts(secs),
                });
            }
            Ok(SendReceipt { message_id })
        })
    }

    fn fetch_messages(&self, _chat_id: &str) -> TransportFuture<'_, Vec<RemoteMessage>> {
        Box::pin(async move {
            self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.inner.fetch_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            if self.inner.fail_fetch.load(Ordering::SeqCst) {
                return Err(TransportError::Status {
                    status: 503,
                    body: "mock fetch failure".into(),
                });
            }
            if let Some(scripted) = self.inner.fetch_responses.lock().unwrap().pop_front() {
                return Ok(scripted);
            }
            Ok(self.inner.log.lock().unwrap().clone())
        })
    }
}
