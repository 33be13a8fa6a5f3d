//! SQL connection route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use domain::models::{SqlConnection, UpdateSqlConnectionRequest};
use domain::repository::Repository;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;

impl CrudResource for SqlConnection {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.sql_connections.clone()
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<SqlConnection>().route("/:id/test", post(test_connection))
}

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
    pub tested_at: DateTime<Utc>,
}

/// Test a stored connection and record the outcome on it.
///
/// POST /api/v1/sql-connections/:id/test
async fn test_connection(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    let repo = state.repos.sql_connections.clone();
    let connection = crud::ensure_visible(&repo, &tenant, id).await?;

    let result = state.sql_executor().test_connection(&connection).await;
    let tested_at = Utc::now();
    let success = result.is_ok();

    repo.update(
        Some(connection.company_id),
        id,
        &UpdateSqlConnectionRequest::tested(success, tested_at),
    )
    .await?;

    let message = match &result {
        Ok(()) => format!("Connection to {} succeeded", connection.name),
        Err(e) => e.to_string(),
    };
    info!(connection_id = %id, success, "SQL connection tested");

    crud::notify_outcome(
        &state,
        &tenant,
        "SQL connection",
        if success { Ok(message.clone()) } else { Err(message.clone()) },
        if success { "Connection test succeeded" } else { "Connection test failed" },
    )
    .await;

    Ok(Json(ConnectionTestResponse {
        success,
        message,
        tested_at,
    }))
}
