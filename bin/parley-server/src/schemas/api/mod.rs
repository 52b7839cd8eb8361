pub mod auth;
pub mod chat;
pub mod history;
pub mod message;
pub mod user;
pub mod webhook;
