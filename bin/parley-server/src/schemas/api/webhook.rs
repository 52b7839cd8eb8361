use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Webhook;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookResponse {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookListResponse {
    pub webhooks: Vec<WebhookResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWebhookRequest {
    pub name: String,
    pub url: String,
}

/// At least one of `name` / `url` must be present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWebhookRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// `{message, webhook}` envelope used by the mutating webhook endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookEnvelope {
    pub message: String,
    pub webhook: WebhookResponse,
}

impl Webhook {
    pub fn to_response(&self) -> WebhookResponse {
        WebhookResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}
