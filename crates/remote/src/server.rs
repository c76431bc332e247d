// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP server implementation.
//!
//! Routes:
//! - `POST /api/v1/chats` creates a chat
//! - `GET  /api/v1/chats/{id}` returns the chat document
//! - `POST /api/v1/chats/{id}/add_member` adds a member
//! - `POST /api/v1/chats/{id}/messages` appends a message
//! - `GET  /api/v1/chats/{id}/messages` lists messages
//! - `GET  /health`

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info};

use pl_core::{AddMemberRequest, ChatInfo, CreateChatRequest, MessageList, OutgoingMessage};

use crate::state::{ServerState, StateError};

/// Run the HTTP server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", listener.local_addr()?);
    serve(listener, state).await?;
    Ok(())
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/chats", post(create_chat))
        .route("/api/v1/chats/:chat_id", get(get_chat))
        .route("/api/v1/chats/:chat_id/add_member", post(add_member))
        .route(
            "/api/v1/chats/:chat_id/messages",
            get(list_messages).post(send_message),
        )
        .with_state(state)
}

impl IntoResponse for StateError {
    fn into_response(self) -> Response {
        let status = match self {
            StateError::ChatNotFound(_) => StatusCode::NOT_FOUND,
            StateError::EmptyText | StateError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
struct SendResponse {
    status: &'static str,
    message_id: String,
}

async fn health(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "chats": state.chat_count().await }))
}

async fn create_chat(
    State(state): State<ServerState>,
    Json(request): Json<CreateChatRequest>,
) -> Result<Json<ChatInfo>, StateError> {
    let info = state.create_chat(&request.chat_name, &request.user_ids).await?;
    debug!(chat_id = %info.chat_id, members = info.members.len(), "chat created");
    Ok(Json(info))
}

async fn get_chat(
    State(state): State<ServerState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatInfo>, StateError> {
    Ok(Json(state.chat(&chat_id).await?))
}

async fn add_member(
    State(state): State<ServerState>,
    Path(chat_id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<serde_json::Value>, StateError> {
    let added = state.add_member(&chat_id, &request.user_id).await?;
    debug!(%chat_id, user_id = %request.user_id, added, "add member");
    Ok(Json(json!({ "status": "success" })))
}

async fn send_message(
    State(state): State<ServerState>,
    Path(chat_id): Path<String>,
    Json(message): Json<OutgoingMessage>,
) -> Result<Json<SendResponse>, StateError> {
    let message_id = state.post_message(&chat_id, message).await?;
    debug!(%chat_id, %message_id, "message stored");
    Ok(Json(SendResponse {
        status: "success",
        message_id,
    }))
}

async fn list_messages(
    State(state): State<ServerState>,
    Path(chat_id): Path<String>,
) -> Result<Json<MessageList>, StateError> {
    let messages = state.messages(&chat_id).await?;
    debug!(%chat_id, count = messages.len(), "messages listed");
    Ok(Json(MessageList { messages }))
}
