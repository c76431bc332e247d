// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the plrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'parley init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("no session token in '{0}'\n  hint: pass a handoff URL containing session=<token>, or the bare token")]
    MissingToken(String),

    #[error("timed out: {0}\n  hint: check that the server at the configured url is running")]
    Timeout(String),

    #[error(transparent)]
    Core(#[from] pl_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for plrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<pl_core::TransportError> for Error {
    fn from(e: pl_core::TransportError) -> Self {
        Error::Core(e.into())
    }
}

impl From<pl_core::DecodeError> for Error {
    fn from(e: pl_core::DecodeError) -> Self {
        Error::Core(e.into())
    }
}

impl From<pl_core::ValidationError> for Error {
    fn from(e: pl_core::ValidationError) -> Self {
        Error::Core(e.into())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
