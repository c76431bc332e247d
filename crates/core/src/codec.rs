// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session codec for handoff tokens.
//!
//! A token is a versioned JSON envelope around a [`ChatSession`], encoded as
//! URL-safe base64 without padding so it can sit in a query parameter as-is:
//!
//! ```text
//! base64url({"v":1,"messages":[...],"participants":{...}})
//! ```
//!
//! Decoding distinguishes a token that is not valid base64/JSON
//! ([`DecodeError::Malformed`]) from one that parses but does not describe a
//! session ([`DecodeError::SchemaMismatch`]).

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{ChatSession, Message, Participant};

/// Envelope version written by [`encode`].
pub const FORMAT_VERSION: u32 = 1;

/// Default upper bound on the length of an encoded token, in bytes.
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 16 * 1024;

/// Query parameter carrying the token in a handoff URL.
pub const SESSION_PARAM: &str = "session";

/// Query parameter carrying the conversation id in a handoff URL.
pub const CHAT_PARAM: &str = "chat";

/// Why a handoff token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token does not describe a session: {0}")]
    SchemaMismatch(String),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    v: u32,
    messages: &'a [Message],
    participants: &'a BTreeMap<String, Participant>,
}

#[derive(Deserialize)]
struct Envelope {
    messages: Vec<Message>,
    participants: BTreeMap<String, Participant>,
}

/// Encodes a session with the default size bound.
pub fn encode(session: &ChatSession) -> String {
    encode_bounded(session, DEFAULT_MAX_TOKEN_BYTES)
}

/// Encodes a session, dropping the oldest messages until the token fits in
/// `max_bytes`.
///
/// Participants are always kept. If even an empty message list does not fit,
/// the token without messages is returned.
pub fn encode_bounded(session: &ChatSession, max_bytes: usize) -> String {
    let all = &session.messages[..];
    let full = encode_slice(all, &session.participants);
    if full.len() <= max_bytes {
        return full;
    }

    // Largest number of trailing messages whose token fits.
    let (mut lo, mut hi) = (0, all.len());
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        let candidate = encode_slice(&all[all.len() - mid..], &session.participants);
        if candidate.len() <= max_bytes {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    tracing::debug!(
        kept = lo,
        dropped = all.len() - lo,
        max_bytes,
        "handoff token truncated"
    );
    encode_slice(&all[all.len() - lo..], &session.participants)
}

fn encode_slice(messages: &[Message], participants: &BTreeMap<String, Participant>) -> String {
    let envelope = EnvelopeRef {
        v: FORMAT_VERSION,
        messages,
        participants,
    };
    to_token(&envelope)
}

/// Serializes `value` into a token. A value that does not serialize yields
/// an empty token, which [`decode`] rejects as malformed.
fn to_token<T: Serialize>(value: &T) -> String {
    match serde_json::to_vec(value) {
        Ok(json) => URL_SAFE_NO_PAD.encode(json),
        Err(e) => {
            tracing::warn!(error = %e, "handoff session failed to serialize");
            String::new()
        }
    }
}

/// Decodes a token produced by [`encode`].
///
/// Surrounding whitespace and trailing `=` padding are tolerated. A session
/// with zero messages is valid.
pub fn decode(token: &str) -> Result<ChatSession, DecodeError> {
    let trimmed = token.trim().trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(DecodeError::Malformed("empty token".to_string()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    match value.get("v").and_then(serde_json::Value::as_u64) {
        Some(v) if v == u64::from(FORMAT_VERSION) => {}
        Some(v) => {
            return Err(DecodeError::SchemaMismatch(format!(
                "unsupported version {}",
                v
            )))
        }
        None => {
            return Err(DecodeError::SchemaMismatch(
                "missing version field".to_string(),
            ))
        }
    }

    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| DecodeError::SchemaMismatch(e.to_string()))?;
    validate(&envelope)?;

    Ok(ChatSession {
        messages: envelope.messages,
        participants: envelope.participants,
    })
}

fn validate(envelope: &Envelope) -> Result<(), DecodeError> {
    for message in &envelope.messages {
        if message.id.is_empty() {
            return Err(DecodeError::SchemaMismatch(
                "message with empty id".to_string(),
            ));
        }
        if message.text.trim().is_empty() {
            return Err(DecodeError::SchemaMismatch(format!(
                "message {} has empty text",
                message.id
            )));
        }
    }
    for (key, participant) in &envelope.participants {
        if key != &participant.id {
            return Err(DecodeError::SchemaMismatch(format!(
                "participant key {} does not match id {}",
                key, participant.id
            )));
        }
    }
    Ok(())
}

/// Conversation id and token extracted from a handoff URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub chat_id: Option<String>,
    pub token: String,
}

/// Builds a handoff URL by appending the chat id and token to `base`.
///
/// Existing query parameters of `base` are kept.
pub fn handoff_url(base: &str, chat_id: &str, token: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair(CHAT_PARAM, chat_id)
        .append_pair(SESSION_PARAM, token);
    Ok(url)
}

/// Extracts the handoff parameters from a URL.
///
/// Returns `None` when `url` does not parse or has no usable `session`
/// parameter. A missing or empty `chat` parameter only clears
/// [`Handoff::chat_id`].
pub fn parse_handoff(url: &str) -> Option<Handoff> {
    let url = Url::parse(url).ok()?;

    let mut chat_id = None;
    let mut token = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            CHAT_PARAM => chat_id = Some(value.into_owned()).filter(|v| !v.is_empty()),
            SESSION_PARAM => token = Some(value.into_owned()).filter(|v| !v.trim().is_empty()),
            _ => {}
        }
    }

    Some(Handoff {
        chat_id,
        token: token?,
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
