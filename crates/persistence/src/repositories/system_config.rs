//! Repository for global system configuration entries.

use async_trait::async_trait;
use domain::models::{CreateSystemConfigRequest, SystemConfig, UpdateSystemConfigRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SystemConfigEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct SystemConfigRepository {
    pool: PgPool,
}

impl SystemConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Entries are global: the company argument is ignored.
#[async_trait]
impl Repository<SystemConfig> for SystemConfigRepository {
    async fn list(&self, _company: Option<Uuid>) -> Result<Vec<SystemConfig>, RepositoryError> {
        let rows = timed(
            "list_system_configs",
            sqlx::query_as::<_, SystemConfigEntity>(
                r#"
                SELECT id, key, value, description, created_at, updated_at
                FROM system_configs
                ORDER BY key
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(SystemConfig::from).collect())
    }

    async fn find(
        &self,
        _company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<SystemConfig>, RepositoryError> {
        let row = timed(
            "find_system_config",
            sqlx::query_as::<_, SystemConfigEntity>(
                r#"
                SELECT id, key, value, description, created_at, updated_at
                FROM system_configs
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SystemConfig::from))
    }

    async fn count_for_company(&self, _company_id: Uuid) -> Result<i64, RepositoryError> {
        Ok(0)
    }

    async fn create(
        &self,
        _company_id: Option<Uuid>,
        input: &CreateSystemConfigRequest,
    ) -> Result<SystemConfig, RepositoryError> {
        let row = timed(
            "create_system_config",
            sqlx::query_as::<_, SystemConfigEntity>(
                r#"
                INSERT INTO system_configs (id, key, value, description)
                VALUES ($1, $2, $3, $4)
                RETURNING id, key, value, description, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&input.key)
            .bind(&input.value)
            .bind(&input.description)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(SystemConfig::from(row))
    }

    async fn update(
        &self,
        _company: Option<Uuid>,
        id: Uuid,
        input: &UpdateSystemConfigRequest,
    ) -> Result<Option<SystemConfig>, RepositoryError> {
        let row = timed(
            "update_system_config",
            sqlx::query_as::<_, SystemConfigEntity>(
                r#"
                UPDATE system_configs SET
                    value = COALESCE($2, value),
                    description = COALESCE($3, description),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, key, value, description, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(&input.value)
            .bind(&input.description)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(SystemConfig::from))
    }

    async fn delete(&self, _company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_system_config",
            sqlx::query("DELETE FROM system_configs WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
