//! Message relay (`POST /chat/send`).
//!
//! The webhook engine generates the reply and appends both sides of the
//! exchange to the history table; this handler only forwards and reports.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::forward::ForwardPayload;
use crate::schemas::api::message::{ReplyResponse, SendMessageRequest};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::store::{ChatStore, WebhookStore};

#[derive(OpenApi)]
#[openapi(paths(send_message), components(schemas(SendMessageRequest, ReplyResponse)))]
pub struct MessageApi;

/// Register message routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/send", post(send_message))
}

/// Forward a user message to the configured webhook and return its reply.
///
/// Target selection: explicit `webhook_id` if given, otherwise the first
/// configured webhook.  A caller without an active chat gets one created on
/// the fly (and a refreshed session cookie pointing at it).
#[utoipa::path(
    post,
    path = "/chat/send",
    tag = "chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Webhook reply", body = ReplyResponse),
        (status = 400, description = "No webhook configured"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Selected webhook not found"),
        (status = 502, description = "Webhook unreachable or non-2xx"),
        (status = 504, description = "Webhook timed out"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<Response, ServerError> {
    let webhook_url = match &req.webhook_id {
        Some(id) => {
            state
                .records
                .get_webhook(id)
                .await?
                .ok_or_else(|| {
                    ServerError::NotFound(
                        "selected webhook not found; please select a valid webhook".into(),
                    )
                })?
                .url
        }
        None => state
            .records
            .list_webhooks()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ServerError::BadRequest(
                    "no webhook is configured; add one via the webhook API first".into(),
                )
            })?
            .url,
    };

    // A session can lose its active chat (e.g. the chat was deleted); start a
    // fresh one rather than failing the message.
    let (chat_id, session_id, refreshed_cookie) = match (user.chat_id.clone(), user.session_id.clone()) {
        (Some(chat_id), Some(session_id)) => (chat_id, session_id, None),
        _ => {
            let chat = state.records.create_chat(&user.user_id, None).await?;
            let claims = user.with_active_chat(chat.id.clone(), chat.session_id.clone());
            let cookie = state.sessions.issue(&claims)?;
            (chat.id, chat.session_id, Some(cookie))
        }
    };

    // Mark the chat as recently used so login resumes it.
    state.records.update_chat(&chat_id, None).await?;

    let payload = ForwardPayload {
        user_message: &req.message,
        session_id: &session_id,
        username: &user.username,
    };
    let reply = state.forwarder.send(&webhook_url, &payload).await?;

    let mut response = Json(ReplyResponse { reply }).into_response();
    if let Some(cookie) = refreshed_cookie {
        response.headers_mut().extend(cookie);
    }
    Ok(response)
}
