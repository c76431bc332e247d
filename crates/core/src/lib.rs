// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pl-core: Chat synchronization engine for parley
//!
//! This crate keeps a local view of a conversation consistent with a remote,
//! append-only message log that is only reachable by polling. It provides the
//! message store, the optimistic send pipeline, the polling scheduler, the
//! handoff codec, and the [`SyncEngine`] facade that composes them.

pub mod clock;
pub mod codec;
pub mod engine;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod model;
mod owner;
pub mod pipeline;
pub mod scheduler;
pub mod store;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, ManualClock, MonotonicStamper, SystemClock};
pub use codec::{decode, encode, encode_bounded, handoff_url, parse_handoff, DecodeError, Handoff};
pub use engine::{EngineConfig, EngineEvent, EngineStatus, LifecycleEvent, SyncEngine};
pub use error::{Error, Result, ValidationError};
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};
pub use model::{ChatSession, Message, Participant};
pub use store::{MessageStore, UpsertOutcome};
pub use transport::{
    AddMemberRequest, ChatInfo, CreateChatRequest, MessageList, OutgoingMessage, RemoteMessage,
    SendReceipt, Transport, TransportError, TransportFuture, TransportResult,
};
