pub mod chat;
pub mod user;
pub mod webhook;

pub use chat::Chat;
pub use user::User;
pub use webhook::Webhook;
