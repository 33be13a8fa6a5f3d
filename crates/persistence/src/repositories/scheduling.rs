//! Repository for scheduling database operations.

use async_trait::async_trait;
use domain::models::{CreateSchedulingRequest, Scheduling, UpdateSchedulingRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SchedulingEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SchedulingRepository {
    pool: PgPool,
}

impl SchedulingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Scheduling> for SchedulingRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<Scheduling>, RepositoryError> {
        let rows = timed(
            "list_schedulings",
            sqlx::query_as::<_, SchedulingEntity>(
                r#"
                SELECT id, company_id, template_id, query_id, name, scheduled_at, recurrence,
                       status, created_at, updated_at
                FROM schedulings
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Scheduling::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<Scheduling>, RepositoryError> {
        let row = timed(
            "find_scheduling",
            sqlx::query_as::<_, SchedulingEntity>(
                r#"
                SELECT id, company_id, template_id, query_id, name, scheduled_at, recurrence,
                       status, created_at, updated_at
                FROM schedulings
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Scheduling::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_schedulings",
            sqlx::query_as("SELECT COUNT(*) FROM schedulings WHERE company_id = $1")
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
        input: &CreateSchedulingRequest,
    ) -> Result<Scheduling, RepositoryError> {
        let row = timed(
            "create_scheduling",
            sqlx::query_as::<_, SchedulingEntity>(
                r#"
                INSERT INTO schedulings (id, company_id, template_id, query_id, name,
                                         scheduled_at, recurrence)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, template_id, query_id, name, scheduled_at, recurrence,
                          status, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.template_id)
            .bind(input.query_id)
            .bind(&input.name)
            .bind(input.scheduled_at)
            .bind(input.recurrence.as_str())
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Scheduling::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSchedulingRequest,
    ) -> Result<Option<Scheduling>, RepositoryError> {
        let row = timed(
            "update_scheduling",
            sqlx::query_as::<_, SchedulingEntity>(
                r#"
                UPDATE schedulings SET
                    template_id = COALESCE($3, template_id),
                    query_id = COALESCE($4, query_id),
                    name = COALESCE($5, name),
                    scheduled_at = COALESCE($6, scheduled_at),
                    recurrence = COALESCE($7, recurrence),
                    status = COALESCE($8, status),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, template_id, query_id, name, scheduled_at, recurrence,
                          status, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(input.template_id)
            .bind(input.query_id)
            .bind(&input.name)
            .bind(input.scheduled_at)
            .bind(input.recurrence.map(|r| r.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Scheduling::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_scheduling",
            sqlx::query(
                "DELETE FROM schedulings WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
