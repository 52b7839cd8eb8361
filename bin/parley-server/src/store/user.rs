use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use super::{FileStore, StoreError, USERS_FILE, UsersDoc, dao::User};

pub trait UserStore: Send + Sync + 'static {
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, StoreError>> + Send;
    fn find_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
    /// Create the user on first login, or bump `last_login` on a repeat
    /// login.  Returns the up-to-date record either way.
    fn login_user(&self, username: &str) -> impl Future<Output = Result<User, StoreError>> + Send;
}

impl UserStore for FileStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let doc: UsersDoc = self.read_doc(USERS_FILE).await?;
        Ok(doc.users)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let doc: UsersDoc = self.read_doc(USERS_FILE).await?;
        Ok(doc
            .users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn login_user(&self, username: &str) -> Result<User, StoreError> {
        let _guard = self.guard().await;
        let mut doc: UsersDoc = self.read_doc(USERS_FILE).await?;
        let now = Utc::now();

        let user = match doc
            .users
            .iter_mut()
            .find(|u| u.username.eq_ignore_ascii_case(username))
        {
            Some(existing) => {
                existing.last_login = now;
                existing.clone()
            }
            None => {
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    username: username.to_owned(),
                    created_at: now,
                    last_login: now,
                };
                doc.users.push(user.clone());
                user
            }
        };

        self.write_doc(USERS_FILE, &doc).await?;
        Ok(user)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn first_login_creates_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let user = store.login_user("alice").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeat_login_bumps_last_login_without_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let first = store.login_user("bob").await.unwrap();
        let second = store.login_user("BOB").await.unwrap();

        assert_eq!(first.id, second.id, "case-insensitive match on username");
        assert!(second.last_login >= first.last_login);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_user_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.login_user("Carol").await.unwrap();
        assert!(store.find_user("carol").await.unwrap().is_some());
        assert!(store.find_user("dave").await.unwrap().is_none());
    }
}
