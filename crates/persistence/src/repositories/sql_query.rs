//! Repository for saved SQL query database operations.

use async_trait::async_trait;
use domain::models::{CreateSqlQueryRequest, SqlQuery, UpdateSqlQueryRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SqlQueryEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SqlQueryRepository {
    pool: PgPool,
}

impl SqlQueryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<SqlQuery> for SqlQueryRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<SqlQuery>, RepositoryError> {
        let rows = timed(
            "list_sql_queries",
            sqlx::query_as::<_, SqlQueryEntity>(
                r#"
                SELECT id, company_id, connection_id, name, description, query_text, is_active,
                       last_executed_at, created_at, updated_at
                FROM sql_queries
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(SqlQuery::from).collect())
    }

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<SqlQuery>, RepositoryError> {
        let row = timed(
            "find_sql_query",
            sqlx::query_as::<_, SqlQueryEntity>(
                r#"
                SELECT id, company_id, connection_id, name, description, query_text, is_active,
                       last_executed_at, created_at, updated_at
                FROM sql_queries
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SqlQuery::from))
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_sql_queries",
            sqlx::query_as("SELECT COUNT(*) FROM sql_queries WHERE company_id = $1")
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
        input: &CreateSqlQueryRequest,
    ) -> Result<SqlQuery, RepositoryError> {
        let row = timed(
            "create_sql_query",
            sqlx::query_as::<_, SqlQueryEntity>(
                r#"
                INSERT INTO sql_queries (id, company_id, connection_id, name, description,
                                         query_text, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, connection_id, name, description, query_text, is_active,
                          last_executed_at, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.connection_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.query_text)
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(SqlQuery::from(row))
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSqlQueryRequest,
    ) -> Result<Option<SqlQuery>, RepositoryError> {
        let row = timed(
            "update_sql_query",
            sqlx::query_as::<_, SqlQueryEntity>(
                r#"
                UPDATE sql_queries SET
                    connection_id = COALESCE($3, connection_id),
                    name = COALESCE($4, name),
                    description = COALESCE($5, description),
                    query_text = COALESCE($6, query_text),
                    is_active = COALESCE($7, is_active),
                    last_executed_at = COALESCE($8, last_executed_at),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, connection_id, name, description, query_text, is_active,
                          last_executed_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(input.connection_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.query_text)
            .bind(input.is_active)
            .bind(input.last_executed_at)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SqlQuery::from))
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_sql_query",
            sqlx::query(
                "DELETE FROM sql_queries WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
