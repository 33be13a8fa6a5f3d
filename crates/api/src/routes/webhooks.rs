//! Webhook integration route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use domain::models::{UpdateWebhookRequest, WebhookIntegration};
use domain::repository::Repository;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;
use crate::services::WebhookTestOutcome;

impl CrudResource for WebhookIntegration {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.webhooks.clone()
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<WebhookIntegration>().route("/:id/test", post(test_webhook))
}

/// Send a signed test event to the webhook URL.
///
/// POST /api/v1/webhooks/:id/test
///
/// Always answers 200 with the delivery outcome; the trigger time and status
/// code are stored on the webhook.
async fn test_webhook(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<WebhookTestOutcome>, ApiError> {
    let webhook = crud::ensure_visible(&state.repos.webhooks, &tenant, id).await?;

    let outcome = state.webhook_tester().send_test(&webhook).await;

    state
        .repos
        .webhooks
        .update(
            Some(webhook.company_id),
            id,
            &UpdateWebhookRequest::triggered(Utc::now(), outcome.status_code),
        )
        .await?;

    let result = if outcome.success {
        Ok(format!("Test event delivered to {}", webhook.name))
    } else {
        Err(outcome
            .error
            .clone()
            .unwrap_or_else(|| "Delivery failed".to_string()))
    };
    let title = if outcome.success {
        "Webhook test succeeded"
    } else {
        "Webhook test failed"
    };
    crud::notify_outcome(&state, &tenant, "webhook", result, title).await;

    Ok(Json(outcome))
}
