//! Webhook forwarder.
//!
//! Relays a user message to the configured external webhook endpoint (the
//! workflow engine) and returns its reply.  The engine is responsible for
//! generating the assistant response *and* for appending both sides of the
//! exchange to the chat-history table; this service never writes history.
//!
//! One synchronous round-trip per request: no retry, no backpressure.  A
//! slow endpoint holds the request open until the client-configured timeout.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::ServerError;

/// Body POSTed to the webhook endpoint.
#[derive(Debug, Serialize)]
pub struct ForwardPayload<'a> {
    pub user_message: &'a str,
    pub session_id: &'a str,
    pub username: &'a str,
}

/// Shared outbound HTTP client with a fixed round-trip timeout.
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: reqwest::Client,
}

impl WebhookForwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POST `payload` to `url` and extract the `reply` string from the JSON
    /// response.
    ///
    /// Error mapping: timeout ⇒ [`ServerError::WebhookTimeout`] (504),
    /// connect failure or non-2xx status ⇒ [`ServerError::WebhookFailed`]
    /// (502), undecodable body or missing `reply` key ⇒
    /// [`ServerError::WebhookBadReply`] (500).
    pub async fn send(
        &self,
        url: &str,
        payload: &ForwardPayload<'_>,
    ) -> Result<String, ServerError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServerError::WebhookTimeout(e.to_string())
                } else {
                    ServerError::WebhookFailed(e.to_string())
                }
            })?;

        let response = response
            .error_for_status()
            .map_err(|e| ServerError::WebhookFailed(e.to_string()))?;

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ServerError::WebhookTimeout(e.to_string())
            } else {
                ServerError::WebhookBadReply(
                    "failed to decode JSON response from the webhook".to_owned(),
                )
            }
        })?;

        body.get("reply")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                ServerError::WebhookBadReply(
                    "webhook response is missing the 'reply' key".to_owned(),
                )
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forwarder(timeout: Duration) -> WebhookForwarder {
        WebhookForwarder::new(timeout).unwrap()
    }

    fn payload<'a>() -> ForwardPayload<'a> {
        ForwardPayload {
            user_message: "hello",
            session_id: "s1",
            username: "alice",
        }
    }

    #[tokio::test]
    async fn reply_is_extracted_from_the_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json_string(
                json!({"user_message": "hello", "session_id": "s1", "username": "alice"})
                    .to_string(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hi there"})))
            .mount(&server)
            .await;

        let reply = forwarder(Duration::from_secs(5))
            .send(&format!("{}/hook", server.uri()), &payload())
            .await
            .unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn non_2xx_is_a_webhook_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = forwarder(Duration::from_secs(5))
            .send(&server.uri(), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::WebhookFailed(_)));
    }

    #[tokio::test]
    async fn missing_reply_key_is_a_bad_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "nope"})))
            .mount(&server)
            .await;

        let err = forwarder(Duration::from_secs(5))
            .send(&server.uri(), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::WebhookBadReply(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_a_bad_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
            .mount(&server)
            .await;

        let err = forwarder(Duration::from_secs(5))
            .send(&server.uri(), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::WebhookBadReply(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"reply": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = forwarder(Duration::from_millis(200))
            .send(&server.uri(), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::WebhookTimeout(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_webhook_failure() {
        // Nothing listens on this port.
        let err = forwarder(Duration::from_secs(1))
            .send("http://127.0.0.1:9/hook", &payload())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::WebhookFailed(_) | ServerError::WebhookTimeout(_)
        ));
    }
}
