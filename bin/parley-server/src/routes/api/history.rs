//! Chat-history reads.
//!
//! History lives in the external table written by the webhook engine; this
//! endpoint is the only place the two stores meet.  Note the deliberate
//! asymmetry: a missing *active chat* is an empty history (200), but an
//! unreachable database is a real error.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::history::{HistoryMessage, HistoryResponse};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::store::ChatStore;

#[derive(OpenApi)]
#[openapi(paths(get_history), components(schemas(HistoryMessage, HistoryResponse)))]
pub struct HistoryApi;

/// Register history routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/history", get(get_history))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub chat_id: Option<String>,
}

/// Full message history for a chat, oldest first.
///
/// With `?chat_id=`, reads that chat (ownership-checked); without it, reads
/// the session's active chat.  No active chat is not an error: the client
/// simply has nothing to render yet.
#[utoipa::path(
    get,
    path = "/api/chat/history",
    tag = "chats",
    params(("chat_id" = Option<String>, Query, description = "Chat to read; defaults to the active chat")),
    responses(
        (status = 200, description = "Ordered history", body = HistoryResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Chat belongs to another user"),
        (status = 404, description = "Chat not found"),
        (status = 500, description = "History database unreachable"),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let (chat_id, session_id) = match query.chat_id {
        Some(chat_id) => {
            let chat = state
                .records
                .get_chat(&chat_id)
                .await?
                .ok_or_else(|| ServerError::NotFound("chat not found".into()))?;
            if chat.user_id != user.user_id {
                return Err(ServerError::Forbidden("unauthorized".into()));
            }
            (Some(chat.id), Some(chat.session_id))
        }
        None => match (user.chat_id, user.session_id) {
            (chat_id, Some(session_id)) => (chat_id, Some(session_id)),
            _ => {
                return Ok(Json(HistoryResponse {
                    chat_id: None,
                    session_id: None,
                    history: Vec::new(),
                    total_messages: 0,
                }));
            }
        },
    };

    let entries = match &session_id {
        Some(sid) => state.history.session_history(sid).await?,
        None => Vec::new(),
    };

    let history: Vec<HistoryMessage> = entries.iter().map(|e| e.to_response()).collect();
    let total_messages = history.len();
    Ok(Json(HistoryResponse {
        chat_id,
        session_id,
        history,
        total_messages,
    }))
}
