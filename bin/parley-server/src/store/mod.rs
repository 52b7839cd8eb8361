//! Flat-file record store.
//!
//! [`UserStore`], [`ChatStore`] and [`WebhookStore`] define the persistence
//! interface for session metadata.  The default implementation is
//! [`FileStore`], which keeps each collection in one JSON document on disk
//! (`users.json`, `chats.json`, `webhooks.json`) and performs whole-file
//! read → mutate → write cycles.  To swap to a real database, implement the
//! three traits for your new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.
//!
//! # Consistency
//!
//! A process-local mutex serializes every read-modify-write cycle, so two
//! concurrent requests cannot lose each other's updates.  Nothing guards
//! against a *second process* writing the same files; expected concurrency
//! is near zero and chat history lives elsewhere, so this is acceptable.
//!
//! Missing files are treated as empty collections.  Malformed files fail the
//! request rather than being silently re-created, so a corrupted store is
//! never overwritten with an empty one.

pub mod chat;
pub mod dao;
pub mod user;
pub mod webhook;

pub use dao::{Chat, User, Webhook};

pub use chat::ChatStore;
pub use user::UserStore;
pub use webhook::WebhookStore;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

pub(crate) const USERS_FILE: &str = "users.json";
pub(crate) const CHATS_FILE: &str = "chats.json";
pub(crate) const WEBHOOKS_FILE: &str = "webhooks.json";

/// Errors surfaced by the flat-file store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ── document wrappers ────────────────────────────────────────────────────────
// Each file holds a single-key object, e.g. `{"users": [...]}`, so the files
// stay hand-editable and self-describing.

#[derive(Debug, Default, Serialize, serde::Deserialize)]
pub(crate) struct UsersDoc {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
pub(crate) struct ChatsDoc {
    #[serde(default)]
    pub chats: Vec<Chat>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
pub(crate) struct WebhooksDoc {
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
}

/// JSON-file-backed implementation of the record-store traits.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store rooted at `data_dir`, creating the directory and empty
    /// collection files if they do not exist yet.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| StoreError::Io { path: data_dir.clone(), source })?;

        let store = Self { data_dir, write_lock: Mutex::new(()) };
        store.seed_missing::<UsersDoc>(USERS_FILE).await?;
        store.seed_missing::<ChatsDoc>(CHATS_FILE).await?;
        store.seed_missing::<WebhooksDoc>(WEBHOOKS_FILE).await?;
        Ok(store)
    }

    fn path_of(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Write an empty document if `file` does not exist yet.
    async fn seed_missing<T: Default + Serialize>(&self, file: &str) -> Result<(), StoreError> {
        let path = self.path_of(file);
        match tokio::fs::metadata(&path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => self.write_doc(file, &T::default()).await,
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Read and parse a whole collection file.  A missing file is an empty
    /// collection; a malformed file is an error.
    pub(crate) async fn read_doc<T: DeserializeOwned + Default>(
        &self,
        file: &str,
    ) -> Result<T, StoreError> {
        let path = self.path_of(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Serialize and write a whole collection file.
    pub(crate) async fn write_doc<T: Serialize>(&self, file: &str, doc: &T) -> Result<(), StoreError> {
        let path = self.path_of(file);
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|source| StoreError::Malformed { path: path.clone(), source })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Acquire the read-modify-write guard.
    pub(crate) async fn guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Directory this store lives in (used by tests and logging).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn open_seeds_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let doc: UsersDoc = store.read_doc(USERS_FILE).await.unwrap();
        assert!(doc.users.is_empty());
        assert!(dir.path().join(CHATS_FILE).exists());
        assert!(dir.path().join(WEBHOOKS_FILE).exists());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        tokio::fs::remove_file(dir.path().join(CHATS_FILE)).await.unwrap();
        let doc: ChatsDoc = store.read_doc(CHATS_FILE).await.unwrap();
        assert!(doc.chats.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join(USERS_FILE), b"{not json")
            .await
            .unwrap();
        let err = store.read_doc::<UsersDoc>(USERS_FILE).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        // The broken file must still be on disk, untouched.
        let raw = tokio::fs::read(dir.path().join(USERS_FILE)).await.unwrap();
        assert_eq!(raw, b"{not json");
    }
}
