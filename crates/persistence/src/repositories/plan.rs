//! Repository for plan database operations.

use async_trait::async_trait;
use domain::models::{CreatePlanRequest, Plan, UpdatePlanRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PlanEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

/// Repository for plans. Plans are global, so the tenant filter is ignored.
#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Plan> for PlanRepository {
    async fn list(&self, _company: Option<Uuid>) -> Result<Vec<Plan>, RepositoryError> {
        let rows = timed(
            "list_plans",
            sqlx::query_as::<_, PlanEntity>(
                r#"
                SELECT id, name, description, price_cents, currency, billing_cycle,
                       max_users, max_sql_connections, max_sql_queries, max_templates,
                       max_schedulings, is_active, created_at, updated_at
                FROM plans
                ORDER BY price_cents, name
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn find(&self, _company: Option<Uuid>, id: Uuid) -> Result<Option<Plan>, RepositoryError> {
        let row = timed(
            "find_plan",
            sqlx::query_as::<_, PlanEntity>(
                r#"
                SELECT id, name, description, price_cents, currency, billing_cycle,
                       max_users, max_sql_connections, max_sql_queries, max_templates,
                       max_schedulings, is_active, created_at, updated_at
                FROM plans
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Plan::try_from).transpose()
    }

    async fn count_for_company(&self, _company_id: Uuid) -> Result<i64, RepositoryError> {
        Ok(0)
    }

    async fn create(
        &self,
        _company_id: Option<Uuid>,
        input: &CreatePlanRequest,
    ) -> Result<Plan, RepositoryError> {
        let row = timed(
            "create_plan",
            sqlx::query_as::<_, PlanEntity>(
                r#"
                INSERT INTO plans (id, name, description, price_cents, currency, billing_cycle,
                                   max_users, max_sql_connections, max_sql_queries,
                                   max_templates, max_schedulings, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING id, name, description, price_cents, currency, billing_cycle,
                          max_users, max_sql_connections, max_sql_queries, max_templates,
                          max_schedulings, is_active, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.billing_cycle.as_str())
            .bind(input.max_users)
            .bind(input.max_sql_connections)
            .bind(input.max_sql_queries)
            .bind(input.max_templates)
            .bind(input.max_schedulings)
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Plan::try_from(row)
    }

    async fn update(
        &self,
        _company: Option<Uuid>,
        id: Uuid,
        input: &UpdatePlanRequest,
    ) -> Result<Option<Plan>, RepositoryError> {
        let row = timed(
            "update_plan",
            sqlx::query_as::<_, PlanEntity>(
                r#"
                UPDATE plans SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    price_cents = COALESCE($4, price_cents),
                    currency = COALESCE($5, currency),
                    billing_cycle = COALESCE($6, billing_cycle),
                    max_users = COALESCE($7, max_users),
                    max_sql_connections = COALESCE($8, max_sql_connections),
                    max_sql_queries = COALESCE($9, max_sql_queries),
                    max_templates = COALESCE($10, max_templates),
                    max_schedulings = COALESCE($11, max_schedulings),
                    is_active = COALESCE($12, is_active),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, description, price_cents, currency, billing_cycle,
                          max_users, max_sql_connections, max_sql_queries, max_templates,
                          max_schedulings, is_active, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.billing_cycle.map(|c| c.as_str()))
            .bind(input.max_users)
            .bind(input.max_sql_connections)
            .bind(input.max_sql_queries)
            .bind(input.max_templates)
            .bind(input.max_schedulings)
            .bind(input.is_active)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Plan::try_from).transpose()
    }

    async fn delete(&self, _company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_plan",
            sqlx::query("DELETE FROM plans WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
