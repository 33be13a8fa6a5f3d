//! Evolution API configuration route handlers.
//!
//! Each company has at most one configuration. Reads and writes go to the
//! `evolution_configs` table; when it is unavailable they fall back to the
//! local JSON copy kept by [`EvolutionFallbackStore`](crate::services::EvolutionFallbackStore).

use axum::{extract::State, routing::get, routing::post, Json, Router};
use chrono::Utc;
use domain::models::{CreateEvolutionConfigRequest, EvolutionConfig, SendTextRequest};
use domain::repository::{RepositoryError, Resource};
use domain::services::{Notification, ServiceError};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use super::crud;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_config).put(save_config))
        .route("/status", get(get_status))
        .route("/test-message", post(send_test_message))
}

fn require_company(tenant: &Tenant) -> Result<Uuid, ApiError> {
    tenant
        .company_id()
        .ok_or_else(|| ApiError::Validation("Select a company first".into()))
}

/// Current configuration, from the table or the local copy.
async fn load_config(state: &AppState, company_id: Uuid) -> Result<Option<EvolutionConfig>, ApiError> {
    match state.repos.evolution_configs.list(Some(company_id)).await {
        Ok(configs) => Ok(configs.into_iter().next()),
        Err(e) => {
            warn!(company_id = %company_id, error = %e, "Evolution config table unavailable, using local copy");
            state
                .evolution_fallback
                .load(company_id)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))
        }
    }
}

async fn require_config(state: &AppState, company_id: Uuid) -> Result<EvolutionConfig, ApiError> {
    load_config(state, company_id)
        .await?
        .ok_or_else(|| ApiError::from(ServiceError::not_found(EvolutionConfig::LABEL)))
}

/// Get the company's Evolution API configuration (`null` when not configured).
///
/// GET /api/v1/evolution
async fn get_config(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Option<EvolutionConfig>>, ApiError> {
    let company_id = require_company(&tenant)?;
    Ok(Json(load_config(&state, company_id).await?))
}

/// Create or replace the company's configuration.
///
/// PUT /api/v1/evolution
async fn save_config(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(input): Json<CreateEvolutionConfigRequest>,
) -> Result<Json<EvolutionConfig>, ApiError> {
    let company_id = require_company(&tenant)?;
    if let Err(e) = input.validate() {
        let err = ApiError::from(e);
        crud::notify_outcome(
            &state,
            &tenant,
            EvolutionConfig::LABEL,
            Err(err.to_string()),
            "Error saving Evolution API configuration",
        )
        .await;
        return Err(err);
    }

    let service = state.service(state.repos.evolution_configs.clone());
    let stored = match service.repository().list(Some(company_id)).await {
        Ok(existing) => match existing.into_iter().next() {
            Some(current) => service.update(&tenant.ctx, current.id, input.clone().into()).await,
            None => service.create(&tenant.ctx, input.clone()).await,
        },
        Err(e) => Err(ServiceError::Repository(e)),
    };

    match stored {
        Ok(config) => {
            // The table is authoritative again; drop any local copy.
            if let Err(e) = state.evolution_fallback.remove(company_id).await {
                warn!(company_id = %company_id, error = %e, "Failed to remove local Evolution config");
            }
            Ok(Json(config))
        }
        Err(ServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            warn!(company_id = %company_id, reason = %reason, "Saving Evolution config locally");
            let previous = state.evolution_fallback.load(company_id).await.ok().flatten();
            let now = Utc::now();
            let mut config = EvolutionConfig::materialize(
                previous.as_ref().map_or_else(Uuid::new_v4, |p| p.id),
                Some(company_id),
                &input,
                now,
            );
            if let Some(previous) = previous {
                config.created_at = previous.created_at;
            }

            state
                .evolution_fallback
                .save(&config)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            state
                .notifier
                .notify(
                    Notification::warning(
                        "Evolution API configuration saved locally",
                        "The database is unavailable; the configuration was kept on this server",
                    )
                    .for_context(&tenant.ctx)
                    .with_source(EvolutionConfig::LABEL),
                )
                .await;
            Ok(Json(config))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Serialize)]
pub struct EvolutionStatusResponse {
    pub instance: String,
    pub state: String,
    pub connected: bool,
}

/// Ask the gateway for the instance's connection state.
///
/// GET /api/v1/evolution/status
async fn get_status(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<EvolutionStatusResponse>, ApiError> {
    let company_id = require_company(&tenant)?;
    let config = require_config(&state, company_id).await?;

    let connection = state.evolution_client().connection_state(&config).await?;
    Ok(Json(EvolutionStatusResponse {
        connected: connection.is_open(),
        instance: connection.instance,
        state: connection.state,
    }))
}

#[derive(Debug, Serialize)]
pub struct TestMessageResponse {
    pub success: bool,
    pub response: Value,
}

/// Send a text message through the gateway.
///
/// POST /api/v1/evolution/test-message
async fn send_test_message(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(message): Json<SendTextRequest>,
) -> Result<Json<TestMessageResponse>, ApiError> {
    let company_id = require_company(&tenant)?;
    message.validate()?;
    let config = require_config(&state, company_id).await?;

    let result = state.evolution_client().send_text(&config, &message).await;
    let outcome = match &result {
        Ok(_) => Ok(format!("Message sent to {}", message.number)),
        Err(e) => Err(e.to_string()),
    };
    let title = if result.is_ok() {
        "Test message sent"
    } else {
        "Error sending test message"
    };
    crud::notify_outcome(&state, &tenant, EvolutionConfig::LABEL, outcome, title).await;

    Ok(Json(TestMessageResponse {
        success: true,
        response: result?,
    }))
}
