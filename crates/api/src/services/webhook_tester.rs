//! Webhook test delivery.
//!
//! Sends a single signed test event to a webhook endpoint. There is no retry;
//! the outcome is reported back to the caller and stored on the webhook.

use std::time::Duration;

use chrono::Utc;
use domain::models::WebhookIntegration;
use reqwest::Client;
use serde::Serialize;
use shared::crypto::sign_payload;
use tracing::{info, warn};
use uuid::Uuid;

use crate::middleware::metrics::record_outbound_call;

/// Header carrying the `sha256=<hex>` HMAC of the request body.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

pub const TEST_EVENT: &str = "webhook.test";

#[derive(Debug, Clone, Serialize)]
pub struct WebhookTestPayload {
    pub event: &'static str,
    pub timestamp: i64,
    pub company_id: Uuid,
    pub webhook_id: Uuid,
}

/// Result of a test delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookTestOutcome {
    pub success: bool,
    pub status_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct WebhookTester {
    client: Client,
    timeout: Duration,
}

impl WebhookTester {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Posts the test event. Network failures are part of the outcome, not errors.
    pub async fn send_test(&self, webhook: &WebhookIntegration) -> WebhookTestOutcome {
        let payload = WebhookTestPayload {
            event: TEST_EVENT,
            timestamp: Utc::now().timestamp(),
            company_id: webhook.company_id,
            webhook_id: webhook.id,
        };

        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                return WebhookTestOutcome {
                    success: false,
                    status_code: None,
                    error: Some(e.to_string()),
                }
            }
        };

        let mut request = self
            .client
            .post(&webhook.url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(secret) = webhook.secret.as_deref().filter(|s| !s.is_empty()) {
            request = request.header(SIGNATURE_HEADER, sign_payload(secret, &body));
        }

        let outcome = match request.body(body).send().await {
            Ok(response) => {
                let status = response.status();
                WebhookTestOutcome {
                    success: status.is_success(),
                    status_code: Some(i32::from(status.as_u16())),
                    error: (!status.is_success())
                        .then(|| format!("Endpoint answered with status {}", status.as_u16())),
                }
            }
            Err(e) => WebhookTestOutcome {
                success: false,
                status_code: None,
                error: Some(if e.is_timeout() {
                    "Request timed out".to_string()
                } else {
                    format!("Request failed: {}", e)
                }),
            },
        };

        record_outbound_call("webhook", outcome.success);
        if outcome.success {
            info!(webhook_id = %webhook.id, status = ?outcome.status_code, "Webhook test delivered");
        } else {
            warn!(webhook_id = %webhook.id, error = ?outcome.error, "Webhook test failed");
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn webhook(url: String, secret: Option<&str>) -> WebhookIntegration {
        WebhookIntegration {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "CRM".into(),
            url,
            events: vec!["scheduling.executed".into()],
            secret: secret.map(str::to_string),
            is_active: true,
            last_triggered_at: None,
            last_status_code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tester() -> WebhookTester {
        WebhookTester::new(Client::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_signed_delivery_succeeds_on_2xx() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header(SIGNATURE_HEADER, Matcher::Regex("^sha256=[0-9a-f]{64}$".into()))
            .match_body(Matcher::PartialJsonString(
                r#"{"event":"webhook.test"}"#.into(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let outcome = tester()
            .send_test(&webhook(format!("{}/hook", server.url()), Some("s3cret")))
            .await;

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.status_code, Some(204));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_unsigned_delivery_omits_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header(SIGNATURE_HEADER, Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;

        let outcome = tester()
            .send_test(&webhook(format!("{}/hook", server.url()), None))
            .await;

        mock.assert_async().await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let outcome = tester()
            .send_test(&webhook(format!("{}/hook", server.url()), None))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.status_code, Some(500));
        assert!(outcome.error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure() {
        let outcome = tester()
            .send_test(&webhook("http://127.0.0.1:9/hook".into(), None))
            .await;

        assert!(!outcome.success);
        assert!(outcome.status_code.is_none());
        assert!(outcome.error.is_some());
    }
}
