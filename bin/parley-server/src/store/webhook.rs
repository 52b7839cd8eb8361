use std::future::Future;

use uuid::Uuid;

use super::{FileStore, StoreError, WEBHOOKS_FILE, WebhooksDoc, dao::Webhook};

pub trait WebhookStore: Send + Sync + 'static {
    fn list_webhooks(&self) -> impl Future<Output = Result<Vec<Webhook>, StoreError>> + Send;
    fn get_webhook(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Webhook>, StoreError>> + Send;
    fn create_webhook(
        &self,
        name: String,
        url: String,
    ) -> impl Future<Output = Result<Webhook, StoreError>> + Send;
    /// Apply whichever of `name` / `url` are given.  Returns the updated
    /// record, or `None` if the webhook does not exist.
    fn update_webhook(
        &self,
        id: &str,
        name: Option<String>,
        url: Option<String>,
    ) -> impl Future<Output = Result<Option<Webhook>, StoreError>> + Send;
    fn delete_webhook(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

impl WebhookStore for FileStore {
    async fn list_webhooks(&self) -> Result<Vec<Webhook>, StoreError> {
        let doc: WebhooksDoc = self.read_doc(WEBHOOKS_FILE).await?;
        Ok(doc.webhooks)
    }

    async fn get_webhook(&self, id: &str) -> Result<Option<Webhook>, StoreError> {
        let doc: WebhooksDoc = self.read_doc(WEBHOOKS_FILE).await?;
        Ok(doc.webhooks.into_iter().find(|w| w.id == id))
    }

    async fn create_webhook(&self, name: String, url: String) -> Result<Webhook, StoreError> {
        let _guard = self.guard().await;
        let mut doc: WebhooksDoc = self.read_doc(WEBHOOKS_FILE).await?;
        let webhook = Webhook {
            id: Uuid::new_v4().to_string(),
            name,
            url,
        };
        doc.webhooks.push(webhook.clone());
        self.write_doc(WEBHOOKS_FILE, &doc).await?;
        Ok(webhook)
    }

    async fn update_webhook(
        &self,
        id: &str,
        name: Option<String>,
        url: Option<String>,
    ) -> Result<Option<Webhook>, StoreError> {
        let _guard = self.guard().await;
        let mut doc: WebhooksDoc = self.read_doc(WEBHOOKS_FILE).await?;

        let Some(webhook) = doc.webhooks.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        if let Some(n) = name {
            webhook.name = n;
        }
        if let Some(u) = url {
            webhook.url = u;
        }
        let updated = webhook.clone();

        self.write_doc(WEBHOOKS_FILE, &doc).await?;
        Ok(Some(updated))
    }

    async fn delete_webhook(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.guard().await;
        let mut doc: WebhooksDoc = self.read_doc(WEBHOOKS_FILE).await?;
        let before = doc.webhooks.len();
        doc.webhooks.retain(|w| w.id != id);
        if doc.webhooks.len() == before {
            return Ok(false);
        }
        self.write_doc(WEBHOOKS_FILE, &doc).await?;
        Ok(true)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn crud_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let created = store
            .create_webhook("prod".into(), "http://host/hook".into())
            .await
            .unwrap();
        assert_eq!(store.list_webhooks().await.unwrap().len(), 1);

        let updated = store
            .update_webhook(&created.id, None, Some("http://host/hook2".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "prod", "name untouched");
        assert_eq!(updated.url, "http://host/hook2");

        assert!(store.delete_webhook(&created.id).await.unwrap());
        assert!(store.list_webhooks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_webhook_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let res = store
            .update_webhook("nope", Some("x".into()), None)
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn first_webhook_is_the_default_target() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.create_webhook("a".into(), "http://a/".into()).await.unwrap();
        store.create_webhook("b".into(), "http://b/".into()).await.unwrap();

        let hooks = store.list_webhooks().await.unwrap();
        assert_eq!(hooks[0].name, "a", "insertion order preserved");
    }
}
