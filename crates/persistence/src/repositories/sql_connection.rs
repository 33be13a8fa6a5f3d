//! Repository for SQL connection database operations.

use async_trait::async_trait;
use domain::models::{CreateSqlConnectionRequest, SqlConnection, UpdateSqlConnectionRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SqlConnectionEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SqlConnectionRepository {
    pool: PgPool,
}

impl SqlConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<SqlConnection> for SqlConnectionRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<SqlConnection>, RepositoryError> {
        let rows = timed(
            "list_sql_connections",
            sqlx::query_as::<_, SqlConnectionEntity>(
                r#"
                SELECT id, company_id, name, db_type, host, port, database_name, username,
                       password, ssl_enabled, status, last_tested_at, created_at, updated_at
                FROM sql_connections
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(SqlConnection::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<SqlConnection>, RepositoryError> {
        let row = timed(
            "find_sql_connection",
            sqlx::query_as::<_, SqlConnectionEntity>(
                r#"
                SELECT id, company_id, name, db_type, host, port, database_name, username,
                       password, ssl_enabled, status, last_tested_at, created_at, updated_at
                FROM sql_connections
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(SqlConnection::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_sql_connections",
            sqlx::query_as("SELECT COUNT(*) FROM sql_connections WHERE company_id = $1")
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
        input: &CreateSqlConnectionRequest,
    ) -> Result<SqlConnection, RepositoryError> {
        let row = timed(
            "create_sql_connection",
            sqlx::query_as::<_, SqlConnectionEntity>(
                r#"
                INSERT INTO sql_connections (id, company_id, name, db_type, host, port,
                                             database_name, username, password, ssl_enabled)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id, company_id, name, db_type, host, port, database_name, username,
                          password, ssl_enabled, status, last_tested_at, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(&input.name)
            .bind(input.db_type.as_str())
            .bind(&input.host)
            .bind(input.port.unwrap_or_else(|| input.db_type.default_port()))
            .bind(&input.database_name)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.ssl_enabled)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        SqlConnection::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSqlConnectionRequest,
    ) -> Result<Option<SqlConnection>, RepositoryError> {
        let row = timed(
            "update_sql_connection",
            sqlx::query_as::<_, SqlConnectionEntity>(
                r#"
                UPDATE sql_connections SET
                    name = COALESCE($3, name),
                    host = COALESCE($4, host),
                    port = COALESCE($5, port),
                    database_name = COALESCE($6, database_name),
                    username = COALESCE($7, username),
                    password = COALESCE($8, password),
                    ssl_enabled = COALESCE($9, ssl_enabled),
                    status = COALESCE($10, status),
                    last_tested_at = COALESCE($11, last_tested_at),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, name, db_type, host, port, database_name, username,
                          password, ssl_enabled, status, last_tested_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.name)
            .bind(&input.host)
            .bind(input.port)
            .bind(&input.database_name)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.ssl_enabled)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.last_tested_at)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(SqlConnection::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_sql_connection",
            sqlx::query(
                "DELETE FROM sql_connections WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
