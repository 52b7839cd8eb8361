//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::db::HistoryReader;
use crate::forward::WebhookForwarder;
use crate::session::SessionManager;
use crate::store::FileStore;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Flat-file record store for users, chats and webhook targets.
    pub records: Arc<FileStore>,
    /// Read-only reader over the external chat-history table.
    pub history: Arc<HistoryReader>,
    /// Outbound client for webhook calls.
    pub forwarder: Arc<WebhookForwarder>,
    /// Session-cookie signer/verifier.
    pub sessions: SessionManager,
}
