//! Webhook target configuration.
//!
//! Unauthenticated, matching the deployment model: the webhook registry is
//! operator-level configuration, not per-user data.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::webhook::{
    CreateWebhookRequest, UpdateWebhookRequest, WebhookEnvelope, WebhookListResponse,
    WebhookResponse,
};
use crate::state::AppState;
use crate::store::WebhookStore;

#[derive(OpenApi)]
#[openapi(
    paths(list_webhooks, create_webhook, update_webhook, delete_webhook),
    components(schemas(
        WebhookResponse,
        WebhookListResponse,
        WebhookEnvelope,
        CreateWebhookRequest,
        UpdateWebhookRequest
    ))
)]
pub struct WebhooksApi;

/// Register webhook routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks", get(list_webhooks).post(create_webhook))
        .route("/webhooks/{id}", put(update_webhook).delete(delete_webhook))
}

/// All configured webhooks, in priority order (first is the default).
#[utoipa::path(
    get,
    path = "/api/webhooks",
    tag = "webhooks",
    responses((status = 200, description = "Webhook list", body = WebhookListResponse))
)]
pub async fn list_webhooks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WebhookListResponse>, ServerError> {
    let webhooks = state.records.list_webhooks().await?;
    Ok(Json(WebhookListResponse {
        webhooks: webhooks.iter().map(|w| w.to_response()).collect(),
    }))
}

/// Register a webhook endpoint.
#[utoipa::path(
    post,
    path = "/api/webhooks",
    tag = "webhooks",
    request_body = CreateWebhookRequest,
    responses(
        (status = 201, description = "Webhook created", body = WebhookEnvelope),
        (status = 400, description = "Missing name or url"),
    )
)]
pub async fn create_webhook(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWebhookRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if req.name.trim().is_empty() || req.url.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "both 'name' and 'url' are required".into(),
        ));
    }

    let webhook = state.records.create_webhook(req.name, req.url).await?;
    Ok((
        StatusCode::CREATED,
        Json(WebhookEnvelope {
            message: "Webhook created successfully.".into(),
            webhook: webhook.to_response(),
        }),
    ))
}

/// Update a webhook's name and/or url.
#[utoipa::path(
    put,
    path = "/api/webhooks/{id}",
    tag = "webhooks",
    request_body = UpdateWebhookRequest,
    responses(
        (status = 200, description = "Webhook updated", body = WebhookEnvelope),
        (status = 400, description = "Neither name nor url given"),
        (status = 404, description = "Webhook not found"),
    )
)]
pub async fn update_webhook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateWebhookRequest>,
) -> Result<Json<WebhookEnvelope>, ServerError> {
    if req.name.is_none() && req.url.is_none() {
        return Err(ServerError::BadRequest(
            "missing 'name' or 'url' in request body".into(),
        ));
    }

    let webhook = state
        .records
        .update_webhook(&id, req.name, req.url)
        .await?
        .ok_or_else(|| ServerError::NotFound("webhook not found".into()))?;

    Ok(Json(WebhookEnvelope {
        message: "Webhook updated successfully.".into(),
        webhook: webhook.to_response(),
    }))
}

/// Remove a webhook.
#[utoipa::path(
    delete,
    path = "/api/webhooks/{id}",
    tag = "webhooks",
    responses(
        (status = 200, description = "Webhook deleted", body = serde_json::Value),
        (status = 404, description = "Webhook not found"),
    )
)]
pub async fn delete_webhook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.records.delete_webhook(&id).await? {
        return Err(ServerError::NotFound("webhook not found".into()));
    }
    Ok(Json(json!({ "message": "Webhook deleted successfully." })))
}
