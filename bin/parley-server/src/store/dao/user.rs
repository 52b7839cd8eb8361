use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record in `users.json`.
///
/// Identity key is `username`, matched case-insensitively.  Users are created
/// on first login, have `last_login` bumped on every subsequent login, and
/// are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}
