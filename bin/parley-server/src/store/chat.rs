use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use super::{CHATS_FILE, ChatsDoc, FileStore, StoreError, dao::Chat};

pub trait ChatStore: Send + Sync + 'static {
    fn list_chats_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Chat>, StoreError>> + Send;
    fn get_chat(&self, id: &str) -> impl Future<Output = Result<Option<Chat>, StoreError>> + Send;
    /// Create a chat with a fresh id and `session_id`.  When `title` is
    /// `None`, a default of the form `Chat-3 (Jan 7, 22:30)` is generated
    /// from the user's current chat count.
    fn create_chat(
        &self,
        user_id: &str,
        title: Option<String>,
    ) -> impl Future<Output = Result<Chat, StoreError>> + Send;
    /// Apply a new title (when given) and touch `updated_at`.  Returns the
    /// updated record, or `None` if the chat does not exist.
    fn update_chat(
        &self,
        id: &str,
        title: Option<String>,
    ) -> impl Future<Output = Result<Option<Chat>, StoreError>> + Send;
    /// Returns `true` if a record was removed.  History rows keyed by the
    /// chat's `session_id` are never touched.
    fn delete_chat(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

impl ChatStore for FileStore {
    async fn list_chats_for_user(&self, user_id: &str) -> Result<Vec<Chat>, StoreError> {
        let doc: ChatsDoc = self.read_doc(CHATS_FILE).await?;
        Ok(doc
            .chats
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect())
    }

    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, StoreError> {
        let doc: ChatsDoc = self.read_doc(CHATS_FILE).await?;
        Ok(doc.chats.into_iter().find(|c| c.id == id))
    }

    async fn create_chat(&self, user_id: &str, title: Option<String>) -> Result<Chat, StoreError> {
        let _guard = self.guard().await;
        let mut doc: ChatsDoc = self.read_doc(CHATS_FILE).await?;
        let now = Utc::now();

        let title = match title {
            Some(t) => t,
            None => {
                let count = doc.chats.iter().filter(|c| c.user_id == user_id).count();
                format!("Chat-{} ({})", count + 1, now.format("%b %-d, %H:%M"))
            }
        };

        let chat = Chat {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            session_id: Uuid::new_v4().to_string(),
            title,
            created_at: now,
            updated_at: now,
        };
        doc.chats.push(chat.clone());
        self.write_doc(CHATS_FILE, &doc).await?;
        Ok(chat)
    }

    async fn update_chat(&self, id: &str, title: Option<String>) -> Result<Option<Chat>, StoreError> {
        let _guard = self.guard().await;
        let mut doc: ChatsDoc = self.read_doc(CHATS_FILE).await?;

        let Some(chat) = doc.chats.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(t) = title {
            chat.title = t;
        }
        chat.updated_at = Utc::now();
        let updated = chat.clone();

        self.write_doc(CHATS_FILE, &doc).await?;
        Ok(Some(updated))
    }

    async fn delete_chat(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.guard().await;
        let mut doc: ChatsDoc = self.read_doc(CHATS_FILE).await?;
        let before = doc.chats.len();
        doc.chats.retain(|c| c.id != id);
        if doc.chats.len() == before {
            return Ok(false);
        }
        self.write_doc(CHATS_FILE, &doc).await?;
        Ok(true)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn created_chats_have_distinct_session_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        for _ in 0..5 {
            store.create_chat("u1", None).await.unwrap();
        }
        let chats = store.list_chats_for_user("u1").await.unwrap();
        assert_eq!(chats.len(), 5);

        let sessions: HashSet<_> = chats.iter().map(|c| c.session_id.clone()).collect();
        assert_eq!(sessions.len(), 5, "session_id must be unique per chat");
    }

    #[tokio::test]
    async fn default_title_counts_only_this_users_chats() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.create_chat("u1", None).await.unwrap();
        store.create_chat("u2", None).await.unwrap();
        let second = store.create_chat("u1", None).await.unwrap();
        assert!(
            second.title.starts_with("Chat-2 ("),
            "got title {:?}",
            second.title
        );
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.create_chat("u1", Some("mine".into())).await.unwrap();
        store.create_chat("u2", Some("theirs".into())).await.unwrap();

        let chats = store.list_chats_for_user("u1").await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "mine");
    }

    #[tokio::test]
    async fn update_renames_and_touches_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let chat = store.create_chat("u1", Some("old".into())).await.unwrap();
        let updated = store
            .update_chat(&chat.id, Some("new".into()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "new");
        assert!(updated.updated_at >= chat.updated_at);
        assert_eq!(updated.session_id, chat.session_id, "session_id immutable");
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let a = store.create_chat("u1", None).await.unwrap();
        let b = store.create_chat("u1", None).await.unwrap();

        assert!(store.delete_chat(&a.id).await.unwrap());
        assert!(!store.delete_chat(&a.id).await.unwrap(), "already gone");

        let remaining = store.list_chats_for_user("u1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }
}
