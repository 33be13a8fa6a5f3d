//! Evolution API (WhatsApp gateway) client.

use std::time::Duration;

use domain::models::{ConnectionState, EvolutionConfig, SendTextRequest};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::record_outbound_call;

#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("Evolution API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Evolution API answered with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Evolution API configuration is inactive")]
    Inactive,
}

impl From<EvolutionError> for ApiError {
    fn from(err: EvolutionError) -> Self {
        match err {
            EvolutionError::Inactive => ApiError::Validation(err.to_string()),
            _ => ApiError::BadGateway(err.to_string()),
        }
    }
}

pub struct EvolutionClient {
    client: Client,
    timeout: Duration,
}

impl EvolutionClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// GET `instance/connectionState/{instance}`.
    pub async fn connection_state(
        &self,
        config: &EvolutionConfig,
    ) -> Result<ConnectionState, EvolutionError> {
        let result = self.fetch_state(config).await;
        record_outbound_call("evolution", result.is_ok());
        result
    }

    async fn fetch_state(&self, config: &EvolutionConfig) -> Result<ConnectionState, EvolutionError> {
        let response = self
            .client
            .get(config.endpoint("instance/connectionState"))
            .header("apikey", &config.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let body: Value = check_status(response).await?.json().await?;

        // The gateway nests the state under `instance` in recent versions.
        let state = body
            .pointer("/instance/state")
            .or_else(|| body.get("state"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        Ok(ConnectionState {
            instance: config.instance_name.clone(),
            state,
        })
    }

    /// POST `message/sendText/{instance}`; returns the gateway's JSON answer.
    pub async fn send_text(
        &self,
        config: &EvolutionConfig,
        message: &SendTextRequest,
    ) -> Result<Value, EvolutionError> {
        if !config.is_active {
            return Err(EvolutionError::Inactive);
        }

        let result = async {
            let response = self
                .client
                .post(config.endpoint("message/sendText"))
                .header("apikey", &config.api_key)
                .timeout(self.timeout)
                .json(&serde_json::json!({
                    "number": message.number,
                    "text": message.text,
                }))
                .send()
                .await?;
            Ok::<_, EvolutionError>(check_status(response).await?.json::<Value>().await?)
        }
        .await;

        record_outbound_call("evolution", result.is_ok());
        match &result {
            Ok(_) => info!(instance = %config.instance_name, "Test message sent"),
            Err(e) => warn!(instance = %config.instance_name, error = %e, "Test message failed"),
        }
        result
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EvolutionError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(EvolutionError::Status { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockito::Matcher;
    use uuid::Uuid;

    fn config(api_url: String) -> EvolutionConfig {
        EvolutionConfig {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            api_url,
            api_key: "evo-key".into(),
            instance_name: "loja".into(),
            webhook_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn client() -> EvolutionClient {
        EvolutionClient::new(Client::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_connection_state_reads_nested_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/instance/connectionState/loja")
            .match_header("apikey", "evo-key")
            .with_status(200)
            .with_body(r#"{"instance":{"instanceName":"loja","state":"open"}}"#)
            .create_async()
            .await;

        let state = client().connection_state(&config(server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(state.instance, "loja");
        assert!(state.is_open());
    }

    #[tokio::test]
    async fn test_connection_state_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/instance/connectionState/loja")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let err = client().connection_state(&config(server.url())).await.unwrap_err();
        assert!(matches!(err, EvolutionError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_send_text_posts_number_and_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/message/sendText/loja")
            .match_header("apikey", "evo-key")
            .match_body(Matcher::Json(serde_json::json!({
                "number": "5511999998888",
                "text": "Olá"
            })))
            .with_status(201)
            .with_body(r#"{"key":{"id":"ABC"}}"#)
            .create_async()
            .await;

        let answer = client()
            .send_text(
                &config(format!("{}/", server.url())),
                &SendTextRequest {
                    number: "5511999998888".into(),
                    text: "Olá".into(),
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(answer["key"]["id"], "ABC");
    }

    #[tokio::test]
    async fn test_inactive_config_does_not_send() {
        let mut cfg = config("http://127.0.0.1:9".into());
        cfg.is_active = false;
        let err = client()
            .send_text(
                &cfg,
                &SendTextRequest {
                    number: "5511999998888".into(),
                    text: "x".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EvolutionError::Inactive));
    }
}
