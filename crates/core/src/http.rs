// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the chat REST API.
//!
//! | Operation        | Request                                  |
//! |------------------|------------------------------------------|
//! | `create_chat`    | `POST /api/v1/chats`                     |
//! | `send_message`   | `POST /api/v1/chats/{id}/messages`       |
//! | `fetch_messages` | `GET  /api/v1/chats/{id}/messages`       |
//! | `add_member`     | `POST /api/v1/chats/{id}/add_member`     |

use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;
use url::Url;

use crate::transport::{
    AddMemberRequest, ChatInfo, CreateChatRequest, MessageList, OutgoingMessage, RemoteMessage,
    SendReceipt, Transport, TransportError, TransportFuture, TransportResult,
};

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Server root, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Per-request timeout. A timeout counts as an unreachable server.
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpConfig {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`Transport`] over the chat server's REST API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds the client. A base URL that cannot carry a path is refused
    /// up front, the same way an unreachable server is reported.
    pub fn new(config: HttpConfig) -> TransportResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                TransportError::Unreachable(format!("invalid server url: {}", config.base_url))
            })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        Ok(HttpTransport { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn chats_url(&self) -> Url {
        self.endpoint(&[])
    }

    fn chat_url(&self, chat_id: &str, suffix: &str) -> Url {
        self.endpoint(&[chat_id, suffix])
    }

    /// `{base}/api/v1/chats/{segments..}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "v1", "chats"])
                .extend(segments);
        }
        url
    }
}

async fn execute<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> TransportResult<T> {
    let response = request.send().await.map_err(request_error)?;
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "response");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Unreachable(e.to_string())
        } else {
            TransportError::MalformedBody(e.to_string())
        }
    })
}

fn request_error(e: reqwest::Error) -> TransportError {
    TransportError::Unreachable(e.to_string())
}

impl Transport for HttpTransport {
    fn create_chat(&self, name: &str, participant_ids: &[String]) -> TransportFuture<'_, ChatInfo> {
        let body = CreateChatRequest {
            chat_name: name.to_string(),
            user_ids: participant_ids.to_vec(),
        };
        let request = self.client.post(self.chats_url()).json(&body);
        Box::pin(execute(request))
    }

    fn add_member(&self, chat_id: &str, user_id: &str) -> TransportFuture<'_, ()> {
        let body = AddMemberRequest {
            user_id: user_id.to_string(),
        };
        let request = self
            .client
            .post(self.chat_url(chat_id, "add_member"))
            .json(&body);
        Box::pin(async move {
            execute::<IgnoredAny>(request).await?;
            Ok(())
        })
    }

    fn send_message(
        &self,
        chat_id: &str,
        message: &OutgoingMessage,
    ) -> TransportFuture<'_, SendReceipt> {
        let request = self
            .client
            .post(self.chat_url(chat_id, "messages"))
            .json(message);
        Box::pin(execute(request))
    }

    fn fetch_messages(&self, chat_id: &str) -> TransportFuture<'_, Vec<RemoteMessage>> {
        let request = self.client.get(self.chat_url(chat_id, "messages"));
        Box::pin(async move {
            let list: MessageList = execute(request).await?;
            Ok(list.messages)
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
