// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pl-core operations.

use thiserror::Error;

pub use crate::codec::DecodeError;
pub use crate::transport::TransportError;

/// Input rejected before any I/O is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message text is empty\n  hint: type something other than whitespace")]
    EmptyText,
}

/// All possible errors that can occur in pl-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid handoff token: {0}")]
    Decode(#[from] DecodeError),

    #[error("engine is not attached to a conversation\n  hint: call attach() first")]
    NotAttached,

    #[error("no pending message with id: {0}")]
    UnknownPending(String),

    #[error("pending message {0} is still sending\n  hint: only failed sends can be retried")]
    NotFailed(String),

    #[error("sync engine has shut down")]
    EngineClosed,
}

/// A specialized Result type for pl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
