//! System configuration route handlers.
//!
//! Entries are global key/value pairs addressed by key. Everyone reads;
//! only masters write.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use domain::models::{CreateSystemConfigRequest, SystemConfig, UpdateSystemConfigRequest};
use domain::repository::{Repository, Resource};
use domain::services::ServiceError;
use serde::Deserialize;
use serde_json::Value;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

impl CrudResource for SystemConfig {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.system_configs.clone()
    }

    fn authorize(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
        if action.is_write() {
            user.require_master()
        } else {
            Ok(())
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(crud::list::<SystemConfig>).post(crud::create::<SystemConfig>),
        )
        .route(
            "/:key",
            get(get_by_key).put(upsert_by_key).delete(delete_by_key),
        )
}

async fn find_by_key(state: &AppState, key: &str) -> Result<Option<SystemConfig>, ApiError> {
    let configs = state.repos.system_configs.list(None).await?;
    Ok(configs.into_iter().find(|c| c.key == key))
}

fn not_found() -> ApiError {
    ServiceError::not_found(SystemConfig::LABEL).into()
}

/// GET /api/v1/system-configs/:key
async fn get_by_key(
    State(state): State<AppState>,
    _tenant: Tenant,
    Path(key): Path<String>,
) -> Result<Json<SystemConfig>, ApiError> {
    find_by_key(&state, &key).await?.map(Json).ok_or_else(not_found)
}

#[derive(Debug, Deserialize)]
pub struct UpsertConfigRequest {
    pub value: Value,
    pub description: Option<String>,
}

/// Create the entry or replace its value.
///
/// PUT /api/v1/system-configs/:key
async fn upsert_by_key(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(key): Path<String>,
    Json(request): Json<UpsertConfigRequest>,
) -> Result<(StatusCode, Json<SystemConfig>), ApiError> {
    tenant.user.require_master()?;
    let service = crud::service::<SystemConfig>(&state);

    match find_by_key(&state, &key).await? {
        Some(existing) => {
            let update = UpdateSystemConfigRequest {
                value: Some(request.value),
                description: request.description,
            };
            let updated = service.update(&tenant.ctx, existing.id, update).await?;
            Ok((StatusCode::OK, Json(updated)))
        }
        None => {
            let created = service
                .create(
                    &tenant.ctx,
                    CreateSystemConfigRequest {
                        key,
                        value: request.value,
                        description: request.description,
                    },
                )
                .await?;
            Ok((StatusCode::CREATED, Json(created)))
        }
    }
}

/// DELETE /api/v1/system-configs/:key
async fn delete_by_key(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    tenant.user.require_master()?;
    let existing = find_by_key(&state, &key).await?.ok_or_else(not_found)?;
    crud::service::<SystemConfig>(&state)
        .delete(&tenant.ctx, existing.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
