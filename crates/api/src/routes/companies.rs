//! Company route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use domain::models::{
    Company, CompanyUsage, CreateCompanyRequest, UpdateCompanyRequest, UsageMetric,
};
use domain::repository::{LimitKind, Repository};
use domain::services::ServiceError;
use uuid::Uuid;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Tenant};

#[axum::async_trait]
impl CrudResource for Company {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.companies.clone()
    }

    fn authorize(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
        match action {
            Action::Read => Ok(()),
            Action::Update => user.require_user_manager(),
            Action::Create | Action::Delete => user.require_master(),
        }
    }

    async fn before_create(
        state: &AppState,
        _tenant: &Tenant,
        input: &mut CreateCompanyRequest,
    ) -> Result<(), ApiError> {
        ensure_plan_exists(state, input.plan_id).await
    }

    async fn before_update(
        state: &AppState,
        tenant: &Tenant,
        _id: Uuid,
        input: &mut UpdateCompanyRequest,
    ) -> Result<(), ApiError> {
        if !tenant.user.is_master() && (input.plan_id.is_some() || input.status.is_some()) {
            return Err(ApiError::Forbidden(
                "Only master users can change a company's plan or status".into(),
            ));
        }
        ensure_plan_exists(state, input.plan_id).await
    }
}

async fn ensure_plan_exists(state: &AppState, plan_id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(plan_id) = plan_id {
        state
            .repos
            .plans
            .find(None, plan_id)
            .await?
            .ok_or_else(|| ApiError::from(ServiceError::not_found("plan")))?;
    }
    Ok(())
}

pub fn router() -> Router<AppState> {
    crud::router::<Company>().route("/:id/usage", get(get_usage))
}

/// Get a company's usage against its plan.
///
/// GET /api/v1/companies/:id/usage
async fn get_usage(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyUsage>, ApiError> {
    let company = crud::ensure_visible(&state.repos.companies, &tenant, id).await?;
    let limits = state.plan_limits().plan_for(company.id).await?;
    let max = |kind| limits.as_ref().map(|plan| plan.limit_for(kind));
    let repos = &state.repos;

    Ok(Json(CompanyUsage {
        company_id: company.id,
        plan_id: company.plan_id,
        users: UsageMetric::new(
            repos.users.count_for_company(id).await?,
            max(LimitKind::Users),
        ),
        sql_connections: UsageMetric::new(
            repos.sql_connections.count_for_company(id).await?,
            max(LimitKind::SqlConnections),
        ),
        sql_queries: UsageMetric::new(
            repos.sql_queries.count_for_company(id).await?,
            max(LimitKind::SqlQueries),
        ),
        templates: UsageMetric::new(
            repos.templates.count_for_company(id).await?,
            max(LimitKind::Templates),
        ),
        schedulings: UsageMetric::new(
            repos.schedulings.count_for_company(id).await?,
            max(LimitKind::Schedulings),
        ),
    }))
}
