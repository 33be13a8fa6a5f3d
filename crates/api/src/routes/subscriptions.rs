//! Subscription route handlers. Company members read, masters write.

use std::sync::Arc;

use axum::Router;
use domain::models::{CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest};
use domain::repository::Repository;
use domain::services::ServiceError;
use uuid::Uuid;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

async fn ensure_plan_exists(state: &AppState, plan_id: Uuid) -> Result<(), ApiError> {
    state
        .repos
        .plans
        .find(None, plan_id)
        .await?
        .ok_or_else(|| ApiError::from(ServiceError::not_found("plan")))?;
    Ok(())
}

#[axum::async_trait]
impl CrudResource for Subscription {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.subscriptions.clone()
    }

    fn authorize(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
        if action.is_write() {
            user.require_master()
        } else {
            Ok(())
        }
    }

    async fn before_create(
        state: &AppState,
        _tenant: &Tenant,
        input: &mut CreateSubscriptionRequest,
    ) -> Result<(), ApiError> {
        ensure_plan_exists(state, input.plan_id).await
    }

    async fn before_update(
        state: &AppState,
        _tenant: &Tenant,
        _id: Uuid,
        input: &mut UpdateSubscriptionRequest,
    ) -> Result<(), ApiError> {
        match input.plan_id {
            Some(plan_id) => ensure_plan_exists(state, plan_id).await,
            None => Ok(()),
        }
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<Subscription>()
}
