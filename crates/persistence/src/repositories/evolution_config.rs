//! Repository for Evolution API configuration database operations.
//!
//! Each company owns at most one configuration (`company_id` is unique).

use async_trait::async_trait;
use domain::models::{CreateEvolutionConfigRequest, EvolutionConfig, UpdateEvolutionConfigRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EvolutionConfigEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct EvolutionConfigRepository {
    pool: PgPool,
}

impl EvolutionConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<EvolutionConfig> for EvolutionConfigRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<EvolutionConfig>, RepositoryError> {
        let rows = timed(
            "list_evolution_configs",
            sqlx::query_as::<_, EvolutionConfigEntity>(
                r#"
                SELECT id, company_id, api_url, api_key, instance_name, webhook_url, is_active,
                       created_at, updated_at
                FROM evolution_configs
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(EvolutionConfig::from).collect())
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<EvolutionConfig>, RepositoryError> {
        let row = timed(
            "find_evolution_config",
            sqlx::query_as::<_, EvolutionConfigEntity>(
                r#"
                SELECT id, company_id, api_url, api_key, instance_name, webhook_url, is_active,
                       created_at, updated_at
                FROM evolution_configs
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(EvolutionConfig::from))
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_evolution_configs",
            sqlx::query_as("SELECT COUNT(*) FROM evolution_configs WHERE company_id = $1")
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
        input: &CreateEvolutionConfigRequest,
    ) -> Result<EvolutionConfig, RepositoryError> {
        let row = timed(
            "create_evolution_config",
            sqlx::query_as::<_, EvolutionConfigEntity>(
                r#"
                INSERT INTO evolution_configs (id, company_id, api_url, api_key, instance_name,
                                               webhook_url, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, api_url, api_key, instance_name, webhook_url, is_active,
                          created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(&input.api_url)
            .bind(&input.api_key)
            .bind(&input.instance_name)
            .bind(&input.webhook_url)
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(EvolutionConfig::from(row))
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateEvolutionConfigRequest,
    ) -> Result<Option<EvolutionConfig>, RepositoryError> {
        let row = timed(
            "update_evolution_config",
            sqlx::query_as::<_, EvolutionConfigEntity>(
                r#"
                UPDATE evolution_configs SET
                    api_url = COALESCE($3, api_url),
                    api_key = COALESCE($4, api_key),
                    instance_name = COALESCE($5, instance_name),
                    webhook_url = COALESCE($6, webhook_url),
                    is_active = COALESCE($7, is_active),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, api_url, api_key, instance_name, webhook_url, is_active,
                          created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.api_url)
            .bind(&input.api_key)
            .bind(&input.instance_name)
            .bind(&input.webhook_url)
            .bind(input.is_active)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(EvolutionConfig::from))
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_evolution_config",
            sqlx::query(
                "DELETE FROM evolution_configs WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
