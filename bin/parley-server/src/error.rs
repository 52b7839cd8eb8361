//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** Internal errors (Store, Database) are logged with full
//! detail but only a generic message is returned to the caller so that
//! file paths, SQL, or other implementation details never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// All errors that can occur in the parley-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No valid session cookie was presented.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is logged in but does not own the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Propagated from the flat-file record store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Propagated from the chat-history database.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The webhook endpoint did not answer within the timeout.
    #[error("webhook timed out: {0}")]
    WebhookTimeout(String),

    /// The webhook endpoint was unreachable or returned a non-2xx status.
    #[error("webhook call failed: {0}")]
    WebhookFailed(String),

    /// The webhook answered but the body was not the expected shape.
    #[error("bad webhook reply: {0}")]
    WebhookBadReply(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ServerError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),

            // Webhook failures: the operator needs to know which endpoint
            // misbehaved, and the URL is caller-configured anyway.
            ServerError::WebhookTimeout(m) => {
                error!(detail = %m, "webhook request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "the request to the webhook timed out".to_owned(),
                )
            }
            ServerError::WebhookFailed(m) => {
                error!(detail = %m, "webhook call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    format!("webhook call failed; check the URL and ensure the endpoint is running: {m}"),
                )
            }
            ServerError::WebhookBadReply(m) => {
                error!(detail = %m, "webhook returned an unusable reply");
                (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
            }

            // Internal errors: log the full detail, return a generic message.
            ServerError::Store(e) => {
                error!(error = %e, "record store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Database(e) => {
                error!(error = %e, "chat-history database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not load chat history".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        // Log the full error chain before discarding it so diagnostic detail
        // is preserved in the server logs even though clients only see a
        // generic message.
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
