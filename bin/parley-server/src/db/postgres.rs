//! Postgres implementation of the chat-history reader.
//!
//! Uses [`sqlx`] with the `postgres` feature.  The pool is created lazily so
//! the server starts even when the database is down; connection failures
//! surface on the first history request instead.
//!
//! The `sqlx::query_as` (runtime-verified) form is used deliberately so that
//! no `DATABASE_URL` environment variable is needed at compile time.

use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// One chat-history message, already mapped to the client-facing shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// `"user"` or `"assistant"`.
    pub role: String,
    pub content: String,
}

/// Reader over the append-only `n8n_chat_histories` table.
#[derive(Clone, Debug)]
pub struct HistoryReader {
    pool: PgPool,
}

impl HistoryReader {
    /// Build a lazy pool for `url`.  No connection is attempted here.
    pub fn connect_lazy(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(4).connect_lazy(url)?;
        Ok(Self { pool })
    }

    /// All messages for `session_id`, oldest first.  Rows whose `message`
    /// payload has an unknown type are skipped.  No pagination: the full
    /// history is returned on every call.
    pub async fn session_history(
        &self,
        session_id: &str,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let rows: Vec<(i64, String, Value)> = sqlx::query_as(
            "SELECT id, session_id, message \
             FROM n8n_chat_histories WHERE session_id = $1 ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, _, message)| {
                let entry = map_message(&message);
                if entry.is_none() {
                    tracing::debug!(row_id = id, "skipping history row with unknown message type");
                }
                entry
            })
            .collect())
    }

    /// Connectivity probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

/// Map a raw `message` payload to `{role, content}`.
///
/// The workflow engine stores `{"type": "human"|"ai", "content": "..."}`.
/// `human` becomes `user`, `ai` becomes `assistant`; anything else is
/// dropped.  Some deployments store the JSON object double-encoded as a
/// string, so a string payload gets one parse attempt first.
fn map_message(message: &Value) -> Option<HistoryEntry> {
    if let Value::String(raw) = message {
        let parsed: Value = serde_json::from_str(raw).ok()?;
        return map_message(&parsed);
    }

    let obj = message.as_object()?;
    let role = match obj.get("type").and_then(Value::as_str)? {
        "human" => "user",
        "ai" => "assistant",
        _ => return None,
    };
    let content = obj
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    Some(HistoryEntry { role: role.to_owned(), content })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_maps_to_user() {
        let entry = map_message(&json!({"type": "human", "content": "hi"})).unwrap();
        assert_eq!(entry.role, "user");
        assert_eq!(entry.content, "hi");
    }

    #[test]
    fn ai_maps_to_assistant() {
        let entry = map_message(&json!({"type": "ai", "content": "hello"})).unwrap();
        assert_eq!(entry.role, "assistant");
    }

    #[test]
    fn unknown_type_is_skipped() {
        assert!(map_message(&json!({"type": "tool", "content": "x"})).is_none());
        assert!(map_message(&json!({"content": "no type"})).is_none());
        assert!(map_message(&json!(42)).is_none());
    }

    #[test]
    fn missing_content_becomes_empty_string() {
        let entry = map_message(&json!({"type": "human"})).unwrap();
        assert_eq!(entry.content, "");
    }

    #[test]
    fn double_encoded_message_is_parsed() {
        let raw = json!(r#"{"type": "ai", "content": "nested"}"#);
        let entry = map_message(&raw).unwrap();
        assert_eq!(entry.role, "assistant");
        assert_eq!(entry.content, "nested");
    }

    #[test]
    fn garbage_string_is_skipped() {
        assert!(map_message(&json!("not json at all")).is_none());
    }
}
