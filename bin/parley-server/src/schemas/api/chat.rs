use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Chat;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatListResponse {
    pub chats: Vec<ChatResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

/// Body for `PUT /api/chats/{id}`: either a switch-to request
/// (`action: "switch"`) or a metadata update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateChatRequest {
    pub action: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenameChatRequest {
    pub title: String,
}

/// `{message, chat}` envelope used by the mutating chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatEnvelope {
    pub message: String,
    pub chat: ChatResponse,
}

impl Chat {
    pub fn to_response(&self) -> ChatResponse {
        ChatResponse {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            title: self.title.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
