use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::user::{UserListResponse, UserResponse};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::store::UserStore;

#[derive(OpenApi)]
#[openapi(paths(list_users), components(schemas(UserResponse, UserListResponse)))]
pub struct UsersApi;

/// Register user routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/users", get(list_users))
}

/// All registered users.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "User list", body = UserListResponse),
        (status = 401, description = "Not logged in"),
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _user: SessionUser,
) -> Result<Json<UserListResponse>, ServerError> {
    let users = state.records.list_users().await?;
    let total = users.len();
    Ok(Json(UserListResponse {
        users: users.iter().map(|u| u.to_response()).collect(),
        total,
    }))
}
