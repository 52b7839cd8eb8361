use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::HistoryEntry;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryMessage {
    /// `"user"` or `"assistant"`.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub chat_id: Option<String>,
    pub session_id: Option<String>,
    pub history: Vec<HistoryMessage>,
    pub total_messages: usize,
}

impl HistoryEntry {
    pub fn to_response(&self) -> HistoryMessage {
        HistoryMessage {
            role: self.role.clone(),
            content: self.content.clone(),
        }
    }
}
