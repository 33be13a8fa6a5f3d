//! Repository for subscription database operations.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SubscriptionEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Subscription> for SubscriptionRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = timed(
            "list_subscriptions",
            sqlx::query_as::<_, SubscriptionEntity>(
                r#"
                SELECT id, company_id, plan_id, status, started_at, current_period_end,
                       cancelled_at, created_at, updated_at
                FROM subscriptions
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let row = timed(
            "find_subscription",
            sqlx::query_as::<_, SubscriptionEntity>(
                r#"
                SELECT id, company_id, plan_id, status, started_at, current_period_end,
                       cancelled_at, created_at, updated_at
                FROM subscriptions
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Subscription::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_subscriptions",
            sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE company_id = $1")
                .bind(company_id)
                .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(count.0)
    }

    async fn create(
        &self,
        company_id: Option<Uuid>,
        input: &CreateSubscriptionRequest,
    ) -> Result<Subscription, RepositoryError> {
        let row = timed(
            "create_subscription",
            sqlx::query_as::<_, SubscriptionEntity>(
                r#"
                INSERT INTO subscriptions (id, company_id, plan_id, status, started_at,
                                           current_period_end, cancelled_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, plan_id, status, started_at, current_period_end,
                          cancelled_at, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.plan_id)
            .bind(input.status.as_str())
            .bind(input.started_at.unwrap_or_else(Utc::now))
            .bind(input.current_period_end)
            .bind(input.cancelled_at)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Subscription::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSubscriptionRequest,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let row = timed(
            "update_subscription",
            sqlx::query_as::<_, SubscriptionEntity>(
                r#"
                UPDATE subscriptions SET
                    plan_id = COALESCE($3, plan_id),
                    status = COALESCE($4, status),
                    current_period_end = COALESCE($5, current_period_end),
                    cancelled_at = COALESCE($6, cancelled_at),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, plan_id, status, started_at, current_period_end,
                          cancelled_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(input.plan_id)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.current_period_end)
            .bind(input.cancelled_at)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Subscription::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_subscription",
            sqlx::query(
                "DELETE FROM subscriptions WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
            )
            .bind(id)
            .bind(company)
            .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
