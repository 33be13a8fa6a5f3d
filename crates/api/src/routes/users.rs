//! User management route handlers (admins and masters only).

use std::sync::Arc;

use axum::Router;
use domain::models::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use domain::repository::Repository;
use domain::services::ServiceError;
use uuid::Uuid;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

fn ensure_can_grant(tenant: &Tenant, role: Option<UserRole>) -> Result<(), ApiError> {
    if role == Some(UserRole::Master) && !tenant.user.is_master() {
        return Err(ApiError::Forbidden(
            "Only master users can grant the master role".into(),
        ));
    }
    Ok(())
}

#[axum::async_trait]
impl CrudResource for User {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.users.clone()
    }

    fn authorize(user: &CurrentUser, _action: Action) -> Result<(), ApiError> {
        user.require_user_manager()
    }

    async fn before_create(
        state: &AppState,
        tenant: &Tenant,
        input: &mut CreateUserRequest,
    ) -> Result<(), ApiError> {
        ensure_can_grant(tenant, Some(input.role))?;

        // A selected company always wins over the payload.
        if let Some(company_id) = tenant.company_id() {
            input.company_id = Some(company_id);
        } else if !tenant.user.is_master() {
            return Err(ApiError::Validation("Select a company first".into()));
        } else if let Some(company_id) = input.company_id {
            state
                .repos
                .companies
                .find(None, company_id)
                .await?
                .ok_or_else(|| ApiError::from(ServiceError::not_found("company")))?;
        }
        Ok(())
    }

    async fn before_update(
        state: &AppState,
        tenant: &Tenant,
        id: Uuid,
        input: &mut UpdateUserRequest,
    ) -> Result<(), ApiError> {
        ensure_can_grant(tenant, input.role)?;

        if let Some(role) = input.role {
            let target = crud::ensure_visible(&state.repos.users, tenant, id).await?;
            target.check_role_change(role)?;
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<User>()
}
