use serde::{Deserialize, Serialize};

/// A record in `webhooks.json`: a named target endpoint for outgoing
/// messages.  The first configured webhook is the default target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub url: String,
}
