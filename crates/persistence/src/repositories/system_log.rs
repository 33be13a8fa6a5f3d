//! Repository for system log database operations.
//!
//! Logs are append-only: updates never match a row.

use async_trait::async_trait;
use domain::models::{CreateSystemLogRequest, NoUpdate, SystemLog};
use domain::repository::{LogRetention, Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SystemLogEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

/// Upper bound on rows returned by a single listing.
const MAX_LISTED_LOGS: i64 = 1000;

#[derive(Clone)]
pub struct SystemLogRepository {
    pool: PgPool,
}

impl SystemLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<SystemLog> for SystemLogRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<SystemLog>, RepositoryError> {
        let rows = timed(
            "list_system_logs",
            sqlx::query_as::<_, SystemLogEntity>(
                r#"
                SELECT id, company_id, user_id, level, source, message, details, created_at
                FROM system_logs
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(company)
            .bind(MAX_LISTED_LOGS)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(SystemLog::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<SystemLog>, RepositoryError> {
        let row = timed(
            "find_system_log",
            sqlx::query_as::<_, SystemLogEntity>(
                r#"
                SELECT id, company_id, user_id, level, source, message, details, created_at
                FROM system_logs
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(SystemLog::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_system_logs",
            sqlx::query_as("SELECT COUNT(*) FROM system_logs WHERE company_id = $1")
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
        input: &CreateSystemLogRequest,
    ) -> Result<SystemLog, RepositoryError> {
        let row = timed(
            "create_system_log",
            sqlx::query_as::<_, SystemLogEntity>(
                r#"
                INSERT INTO system_logs (id, company_id, user_id, level, source, message, details)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, user_id, level, source, message, details, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.user_id)
            .bind(input.level.as_str())
            .bind(&input.source)
            .bind(&input.message)
            .bind(&input.details)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        SystemLog::try_from(row)
    }

    async fn update(
        &self,
        _company: Option<Uuid>,
        _id: Uuid,
        _input: &NoUpdate,
    ) -> Result<Option<SystemLog>, RepositoryError> {
        Ok(None)
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_system_log",
            sqlx::query(
                "DELETE FROM system_logs WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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

#[async_trait]
impl LogRetention for SystemLogRepository {
    async fn clear(&self, company: Option<Uuid>) -> Result<u64, RepositoryError> {
        let result = timed(
            "clear_system_logs",
            sqlx::query("DELETE FROM system_logs WHERE ($1::uuid IS NULL OR company_id = $1)")
                .bind(company)
                .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
