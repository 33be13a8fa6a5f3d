//! Generic CRUD handlers shared by every resource.
//!
//! A resource opts in by implementing [`CrudResource`], which names its
//! repository and adds role checks and reference checks on top of the
//! [`ResourceService`](domain::services::ResourceService) rules.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use domain::repository::{Repository, Resource};
use domain::services::{Notification, ResourceService};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

#[axum::async_trait]
pub trait CrudResource: Resource + Serialize {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>>;

    /// Role check run before anything else.
    fn authorize(_user: &CurrentUser, _action: Action) -> Result<(), ApiError> {
        Ok(())
    }

    /// Reference checks and caller-derived fields for a new record.
    async fn before_create(
        _state: &AppState,
        _tenant: &Tenant,
        _input: &mut Self::Create,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn before_update(
        _state: &AppState,
        _tenant: &Tenant,
        _id: Uuid,
        _input: &mut Self::Update,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Service for `R` built from the request state.
pub fn service<R: CrudResource>(state: &AppState) -> ResourceService<R> {
    state.service(R::repository(state))
}

/// Fails with 404 when `id` is not visible in the tenant's scope.
pub async fn ensure_visible<R: Resource>(
    repo: &Arc<dyn Repository<R>>,
    tenant: &Tenant,
    id: Uuid,
) -> Result<R, ApiError> {
    let Some(filter) = tenant.filter() else {
        return Err(domain::services::ServiceError::not_found(R::LABEL).into());
    };
    repo.find(filter, id)
        .await?
        .ok_or_else(|| domain::services::ServiceError::not_found(R::LABEL).into())
}

/// Sends a success or error notification for an action outside the CRUD flow.
pub async fn notify_outcome(
    state: &AppState,
    tenant: &Tenant,
    source: &str,
    result: Result<String, String>,
    title: &str,
) {
    let notification = match result {
        Ok(message) => Notification::success(title, message),
        Err(message) => Notification::error(title, message),
    };
    state
        .notifier
        .notify(notification.for_context(&tenant.ctx).with_source(source))
        .await;
}

/// Reports a write rejected by [`CrudResource`] checks before it reached the service.
async fn report_rejected<R: CrudResource>(
    state: &AppState,
    tenant: &Tenant,
    action: &str,
    err: &ApiError,
) {
    let title = format!("Error {} {}", action, R::LABEL);
    state
        .notifier
        .notify(
            Notification::error(title, err.to_string())
                .for_context(&tenant.ctx)
                .with_source(R::LABEL),
        )
        .await;
}

pub async fn list<R: CrudResource>(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Vec<R>>, ApiError> {
    R::authorize(&tenant.user, Action::Read)?;
    let items = service::<R>(&state).list(&tenant.ctx).await?;
    Ok(Json(items))
}

pub async fn get_one<R: CrudResource>(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<R>, ApiError> {
    R::authorize(&tenant.user, Action::Read)?;
    let item = service::<R>(&state).get(&tenant.ctx, id).await?;
    Ok(Json(item))
}

pub async fn create<R: CrudResource>(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(mut input): Json<R::Create>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R::Create: DeserializeOwned,
{
    R::authorize(&tenant.user, Action::Create)?;
    if let Err(err) = R::before_create(&state, &tenant, &mut input).await {
        report_rejected::<R>(&state, &tenant, "creating", &err).await;
        return Err(err);
    }

    let item = service::<R>(&state).create(&tenant.ctx, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update<R: CrudResource>(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(mut input): Json<R::Update>,
) -> Result<Json<R>, ApiError>
where
    R::Update: DeserializeOwned,
{
    R::authorize(&tenant.user, Action::Update)?;
    if let Err(err) = R::before_update(&state, &tenant, id, &mut input).await {
        report_rejected::<R>(&state, &tenant, "updating", &err).await;
        return Err(err);
    }

    let item = service::<R>(&state).update(&tenant.ctx, id, input).await?;
    Ok(Json(item))
}

pub async fn delete<R: CrudResource>(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    R::authorize(&tenant.user, Action::Delete)?;
    service::<R>(&state).delete(&tenant.ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET/POST /` and `GET/PUT/PATCH/DELETE /:id` for `R`.
pub fn router<R>() -> Router<AppState>
where
    R: CrudResource,
    R::Create: DeserializeOwned,
    R::Update: DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route(
            "/:id",
            get(get_one::<R>)
                .put(update::<R>)
                .patch(update::<R>)
                .delete(delete::<R>),
        )
}
