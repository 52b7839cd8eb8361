//! Read-only access to the external chat-history table.
//!
//! All messages are written by the external workflow engine; this service
//! only ever reads them.  The default implementation is
//! [`postgres::HistoryReader`].

pub mod postgres;

pub use postgres::{HistoryEntry, HistoryReader};
