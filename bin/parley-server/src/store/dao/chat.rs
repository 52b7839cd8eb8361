use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record in `chats.json`.
///
/// `session_id` is the join key into the external chat-history table.  It is
/// assigned at creation and never changes, so history rows stay reachable for
/// the whole life of the chat (and become orphaned, not deleted, when the
/// chat record is removed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
