//! Transaction route handlers. Company members read, masters write.

use std::sync::Arc;

use axum::Router;
use domain::models::{CreateTransactionRequest, Transaction};
use domain::repository::Repository;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

#[axum::async_trait]
impl CrudResource for Transaction {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.transactions.clone()
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
        tenant: &Tenant,
        input: &mut CreateTransactionRequest,
    ) -> Result<(), ApiError> {
        match (input.subscription_id, tenant.company_id()) {
            (Some(subscription_id), Some(_)) => {
                crud::ensure_visible(&state.repos.subscriptions, tenant, subscription_id).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<Transaction>()
}
