//! Routes nested under `/api`.

pub mod chats;
pub mod history;
pub mod users;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(users::router())
        .merge(chats::router())
        .merge(history::router())
        .merge(webhooks::router())
}

#[derive(OpenApi)]
#[openapi()]
pub struct ApiV1;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = ApiV1::openapi();
    spec.merge(users::UsersApi::openapi());
    spec.merge(chats::ChatsApi::openapi());
    spec.merge(history::HistoryApi::openapi());
    spec.merge(webhooks::WebhooksApi::openapi());
    spec
}
