//! System log route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use domain::models::{CreateSystemLogRequest, SystemLog};
use domain::repository::Repository;
use serde::Serialize;
use tracing::info;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

#[axum::async_trait]
impl CrudResource for SystemLog {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.system_logs.clone()
    }

    fn authorize(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
        match action {
            Action::Delete => user.require_user_manager(),
            _ => Ok(()),
        }
    }

    async fn before_create(
        _state: &AppState,
        tenant: &Tenant,
        input: &mut CreateSystemLogRequest,
    ) -> Result<(), ApiError> {
        input.user_id = Some(tenant.user.user_id);
        Ok(())
    }
}

/// Logs are append-only: there is no update route.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(crud::list::<SystemLog>)
                .post(crud::create::<SystemLog>)
                .delete(clear_logs),
        )
        .route(
            "/:id",
            get(crud::get_one::<SystemLog>).delete(crud::delete::<SystemLog>),
        )
}

#[derive(Debug, Serialize)]
pub struct ClearLogsResponse {
    pub deleted: u64,
}

/// Delete every log visible in the caller's scope.
///
/// DELETE /api/v1/system-logs
async fn clear_logs(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<ClearLogsResponse>, ApiError> {
    tenant.user.require_user_manager()?;
    let Some(filter) = tenant.filter() else {
        return Ok(Json(ClearLogsResponse { deleted: 0 }));
    };

    let deleted = state.repos.log_retention.clear(filter).await?;
    info!(company_id = ?filter, deleted, "System logs cleared");
    Ok(Json(ClearLogsResponse { deleted }))
}
