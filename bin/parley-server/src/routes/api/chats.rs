//! Chat CRUD plus the switch-active-chat transition.
//!
//! All operations are ownership-checked: a chat is only visible to the user
//! that created it.  Mutations of the *active-chat pointer* live in the
//! session cookie, never in chat metadata, so switching chats does not touch
//! `updated_at`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::chat::{
    ChatEnvelope, ChatListResponse, ChatResponse, CreateChatRequest, RenameChatRequest,
    UpdateChatRequest,
};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::store::{Chat, ChatStore};

#[derive(OpenApi)]
#[openapi(
    paths(list_chats, create_chat, update_chat, rename_chat, delete_chat),
    components(schemas(
        ChatResponse,
        ChatListResponse,
        ChatEnvelope,
        CreateChatRequest,
        UpdateChatRequest,
        RenameChatRequest
    ))
)]
pub struct ChatsApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", get(list_chats).post(create_chat))
        .route("/chats/{id}", put(update_chat).delete(delete_chat))
        .route("/chats/{id}/rename", put(rename_chat))
}

/// Fetch `chat_id` and verify the caller owns it.
async fn owned_chat(
    state: &AppState,
    user: &SessionUser,
    chat_id: &str,
) -> Result<Chat, ServerError> {
    let chat = state
        .records
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("chat not found".into()))?;
    if chat.user_id != user.user_id {
        return Err(ServerError::Forbidden("unauthorized".into()));
    }
    Ok(chat)
}

/// The current user's chats.
#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Chat list", body = ChatListResponse),
        (status = 401, description = "Not logged in"),
    )
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> Result<Json<ChatListResponse>, ServerError> {
    let chats = state.records.list_chats_for_user(&user.user_id).await?;
    let total = chats.len();
    Ok(Json(ChatListResponse {
        chats: chats.iter().map(|c| c.to_response()).collect(),
        total,
    }))
}

/// Create a chat and make it the active one.
#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "chats",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Chat created; session cookie re-issued", body = ChatEnvelope),
        (status = 401, description = "Not logged in"),
    )
)]
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Json(req): Json<CreateChatRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let chat = state.records.create_chat(&user.user_id, req.title).await?;

    let claims = user.with_active_chat(chat.id.clone(), chat.session_id.clone());
    let cookie = state.sessions.issue(&claims)?;

    Ok((
        StatusCode::CREATED,
        cookie,
        Json(ChatEnvelope {
            message: "Chat created successfully.".into(),
            chat: chat.to_response(),
        }),
    ))
}

/// Update a chat, or switch to it (`{"action": "switch"}`).
///
/// Switching only re-issues the session cookie; chat metadata (including
/// `updated_at`) stays untouched.
#[utoipa::path(
    put,
    path = "/api/chats/{id}",
    tag = "chats",
    request_body = UpdateChatRequest,
    responses(
        (status = 200, description = "Chat updated or switched", body = ChatEnvelope),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Chat belongs to another user"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn update_chat(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateChatRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let chat = owned_chat(&state, &user, &id).await?;

    if req.action.as_deref() == Some("switch") {
        let claims = user.with_active_chat(chat.id.clone(), chat.session_id.clone());
        let cookie = state.sessions.issue(&claims)?;
        return Ok((
            StatusCode::OK,
            cookie,
            Json(ChatEnvelope {
                message: "Switched to chat successfully.".into(),
                chat: chat.to_response(),
            }),
        ));
    }

    let updated = state
        .records
        .update_chat(&id, req.title)
        .await?
        .ok_or_else(|| ServerError::NotFound("chat not found".into()))?;

    Ok((
        StatusCode::OK,
        axum::http::HeaderMap::new(),
        Json(ChatEnvelope {
            message: "Chat updated successfully.".into(),
            chat: updated.to_response(),
        }),
    ))
}

/// Rename a chat (dedicated endpoint with title validation).
#[utoipa::path(
    put,
    path = "/api/chats/{id}/rename",
    tag = "chats",
    request_body = RenameChatRequest,
    responses(
        (status = 200, description = "Chat renamed", body = ChatEnvelope),
        (status = 400, description = "Empty or over-long title"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Chat belongs to another user"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn rename_chat(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
    Json(req): Json<RenameChatRequest>,
) -> Result<Json<ChatEnvelope>, ServerError> {
    owned_chat(&state, &user, &id).await?;

    let title = req.title.trim().to_owned();
    if title.is_empty() {
        return Err(ServerError::BadRequest("title cannot be empty".into()));
    }
    if title.chars().count() > 100 {
        return Err(ServerError::BadRequest(
            "title must be 100 characters or less".into(),
        ));
    }

    let updated = state
        .records
        .update_chat(&id, Some(title))
        .await?
        .ok_or_else(|| ServerError::NotFound("chat not found".into()))?;

    Ok(Json(ChatEnvelope {
        message: "Chat renamed successfully.".into(),
        chat: updated.to_response(),
    }))
}

/// Delete a chat's metadata.
///
/// History rows keyed by the chat's `session_id` are left in the external
/// table; they become unreachable through the UI but are never cascaded.
#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    tag = "chats",
    responses(
        (status = 200, description = "Chat deleted", body = serde_json::Value),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Chat belongs to another user"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    owned_chat(&state, &user, &id).await?;

    if !state.records.delete_chat(&id).await? {
        return Err(ServerError::NotFound("chat not found".into()));
    }

    // Deleting the active chat drops the cookie's pointer but keeps the user
    // logged in.
    let cookie = if user.chat_id.as_deref() == Some(id.as_str()) {
        state.sessions.issue(&user.without_active_chat())?
    } else {
        axum::http::HeaderMap::new()
    };

    Ok((
        cookie,
        Json(json!({ "message": "Chat deleted successfully." })),
    ))
}
