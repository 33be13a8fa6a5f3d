//! Repository for SMTP configuration database operations.

use async_trait::async_trait;
use domain::models::{CreateSmtpConfigRequest, SmtpConfig, UpdateSmtpConfigRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SmtpConfigEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SmtpConfigRepository {
    pool: PgPool,
}

impl SmtpConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<SmtpConfig> for SmtpConfigRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<SmtpConfig>, RepositoryError> {
        let rows = timed(
            "list_smtp_configs",
            sqlx::query_as::<_, SmtpConfigEntity>(
                r#"
                SELECT id, company_id, host, port, username, password, from_email, from_name,
                       use_tls, is_active, created_at, updated_at
                FROM smtp_configs
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(SmtpConfig::from).collect())
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<SmtpConfig>, RepositoryError> {
        let row = timed(
            "find_smtp_config",
            sqlx::query_as::<_, SmtpConfigEntity>(
                r#"
                SELECT id, company_id, host, port, username, password, from_email, from_name,
                       use_tls, is_active, created_at, updated_at
                FROM smtp_configs
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SmtpConfig::from))
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_smtp_configs",
            sqlx::query_as("SELECT COUNT(*) FROM smtp_configs WHERE company_id = $1")
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
        input: &CreateSmtpConfigRequest,
    ) -> Result<SmtpConfig, RepositoryError> {
        let row = timed(
            "create_smtp_config",
            sqlx::query_as::<_, SmtpConfigEntity>(
                r#"
                INSERT INTO smtp_configs (id, company_id, host, port, username, password,
                                          from_email, from_name, use_tls, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id, company_id, host, port, username, password, from_email, from_name,
                          use_tls, is_active, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(&input.host)
            .bind(input.port)
            .bind(&input.username)
            .bind(&input.password)
            .bind(&input.from_email)
            .bind(&input.from_name)
            .bind(input.use_tls)
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(SmtpConfig::from(row))
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSmtpConfigRequest,
    ) -> Result<Option<SmtpConfig>, RepositoryError> {
        let row = timed(
            "update_smtp_config",
            sqlx::query_as::<_, SmtpConfigEntity>(
                r#"
                UPDATE smtp_configs SET
                    host = COALESCE($3, host),
                    port = COALESCE($4, port),
                    username = COALESCE($5, username),
                    password = COALESCE($6, password),
                    from_email = COALESCE($7, from_email),
                    from_name = COALESCE($8, from_name),
                    use_tls = COALESCE($9, use_tls),
                    is_active = COALESCE($10, is_active),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, host, port, username, password, from_email, from_name,
                          use_tls, is_active, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.host)
            .bind(input.port)
            .bind(&input.username)
            .bind(&input.password)
            .bind(&input.from_email)
            .bind(&input.from_name)
            .bind(input.use_tls)
            .bind(input.is_active)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SmtpConfig::from))
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_smtp_config",
            sqlx::query(
                "DELETE FROM smtp_configs WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
