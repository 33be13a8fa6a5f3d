//! SMTP configuration route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use domain::models::SmtpConfig;
use domain::repository::Repository;
use serde::Serialize;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;
use crate::middleware::metrics::record_outbound_call;
use crate::services::probe::probe_smtp;

impl CrudResource for SmtpConfig {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.smtp_configs.clone()
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<SmtpConfig>().route("/:id/test", post(test_smtp))
}

#[derive(Debug, Serialize)]
pub struct SmtpTestResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

/// Check that the SMTP server accepts connections.
///
/// POST /api/v1/smtp-configs/:id/test
async fn test_smtp(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<SmtpTestResponse>, ApiError> {
    let config = crud::ensure_visible(&state.repos.smtp_configs, &tenant, id).await?;
    let address = config.address();

    let response = match probe_smtp(&address, state.smtp_timeout()).await {
        Ok(report) => SmtpTestResponse {
            success: true,
            message: format!("SMTP server {} is reachable", address),
            greeting: Some(report.greeting).filter(|g| !g.is_empty()),
        },
        Err(e) => SmtpTestResponse {
            success: false,
            message: e.to_string(),
            greeting: None,
        },
    };
    record_outbound_call("smtp", response.success);

    let (result, title) = if response.success {
        (Ok(response.message.clone()), "SMTP test succeeded")
    } else {
        (Err(response.message.clone()), "SMTP test failed")
    };
    crud::notify_outcome(&state, &tenant, "SMTP configuration", result, title).await;

    Ok(Json(response))
}
