//! Scheduling route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use domain::models::{
    CreateSchedulingRequest, Scheduling, UpdateSchedulingRequest,
};
use domain::repository::Repository;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;

async fn ensure_references(
    state: &AppState,
    tenant: &Tenant,
    template_id: Option<Uuid>,
    query_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(template_id) = template_id {
        crud::ensure_visible(&state.repos.templates, tenant, template_id).await?;
    }
    if let Some(query_id) = query_id {
        crud::ensure_visible(&state.repos.sql_queries, tenant, query_id).await?;
    }
    Ok(())
}

#[axum::async_trait]
impl CrudResource for Scheduling {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.schedulings.clone()
    }

    async fn before_create(
        state: &AppState,
        tenant: &Tenant,
        input: &mut CreateSchedulingRequest,
    ) -> Result<(), ApiError> {
        if tenant.company_id().is_none() {
            return Ok(());
        }
        ensure_references(state, tenant, Some(input.template_id), input.query_id).await
    }

    async fn before_update(
        state: &AppState,
        tenant: &Tenant,
        _id: Uuid,
        input: &mut UpdateSchedulingRequest,
    ) -> Result<(), ApiError> {
        ensure_references(state, tenant, input.template_id, input.query_id).await
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<Scheduling>().route("/:id/cancel", post(cancel_scheduling))
}

/// Cancel a pending scheduling.
///
/// POST /api/v1/schedulings/:id/cancel
async fn cancel_scheduling(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<Scheduling>, ApiError> {
    let scheduling = crud::ensure_visible(&state.repos.schedulings, &tenant, id).await?;
    if !scheduling.can_cancel() {
        return Err(ApiError::Conflict(format!(
            "Only pending schedulings can be cancelled (current status: {})",
            scheduling.status
        )));
    }

    let cancelled = crud::service::<Scheduling>(&state)
        .update(&tenant.ctx, id, UpdateSchedulingRequest::cancel())
        .await?;
    Ok(Json(cancelled))
}
