//! Login / logout.
//!
//! Login is username-only (no password): the service trusts its deployment
//! perimeter, exactly like the webhook engine behind it.  A successful login
//! upserts the user record, picks (or creates) the active chat and installs
//! the session cookie.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::auth::{LoginRequest, LoginResponse};
use crate::session::SessionClaims;
use crate::state::AppState;
use crate::store::{ChatStore, UserStore};

#[derive(OpenApi)]
#[openapi(paths(login, logout), components(schemas(LoginRequest, LoginResponse)))]
pub struct AuthApi;

/// Register auth routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Log in (or register) by username.
///
/// First login creates the user and a default chat; repeat logins bump
/// `last_login` and resume the most recently updated chat.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 400, description = "Missing or too-short username"),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let username = req.username.trim().to_owned();
    if username.chars().count() < 2 {
        return Err(ServerError::BadRequest(
            "username must be at least 2 characters long".into(),
        ));
    }

    let user = state.records.login_user(&username).await?;

    // Resume the most recently updated chat, or start the user off with a
    // default one.
    let chats = state.records.list_chats_for_user(&user.id).await?;
    let active = match chats.into_iter().max_by_key(|c| c.updated_at) {
        Some(latest) => latest,
        None => state.records.create_chat(&user.id, None).await?,
    };

    let claims = SessionClaims::new(
        user.id.clone(),
        user.username.clone(),
        Some((active.id, active.session_id)),
    );
    let cookie = state.sessions.issue(&claims)?;

    tracing::info!(username = %user.username, "login successful");
    Ok((
        cookie,
        Json(LoginResponse {
            message: "Login successful.".into(),
            username: user.username,
        }),
    ))
}

/// Log out by clearing the session cookie.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        state.sessions.clear(),
        Json(json!({ "message": "Logged out." })),
    )
}
