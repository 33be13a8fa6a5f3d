//! Repository for webhook integration database operations.

use async_trait::async_trait;
use domain::models::{CreateWebhookRequest, UpdateWebhookRequest, WebhookIntegration};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::WebhookIntegrationEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct WebhookIntegrationRepository {
    pool: PgPool,
}

impl WebhookIntegrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<WebhookIntegration> for WebhookIntegrationRepository {
    async fn list(
        &self,
        company: Option<Uuid>,
    ) -> Result<Vec<WebhookIntegration>, RepositoryError> {
        let rows = timed(
            "list_webhook_integrations",
            sqlx::query_as::<_, WebhookIntegrationEntity>(
                r#"
                SELECT id, company_id, name, url, events, secret, is_active,
                       last_triggered_at, last_status_code, created_at, updated_at
                FROM webhook_integrations
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(WebhookIntegration::from).collect())
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<WebhookIntegration>, RepositoryError> {
        let row = timed(
            "find_webhook_integration",
            sqlx::query_as::<_, WebhookIntegrationEntity>(
                r#"
                SELECT id, company_id, name, url, events, secret, is_active,
                       last_triggered_at, last_status_code, created_at, updated_at
                FROM webhook_integrations
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(WebhookIntegration::from))
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_webhook_integrations",
            sqlx::query_as("SELECT COUNT(*) FROM webhook_integrations WHERE company_id = $1")
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
        input: &CreateWebhookRequest,
    ) -> Result<WebhookIntegration, RepositoryError> {
        let row = timed(
            "create_webhook_integration",
            sqlx::query_as::<_, WebhookIntegrationEntity>(
                r#"
                INSERT INTO webhook_integrations (id, company_id, name, url, events, secret,
                                                  is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, name, url, events, secret, is_active,
                          last_triggered_at, last_status_code, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.events)
            .bind(&input.secret)
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(WebhookIntegration::from(row))
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateWebhookRequest,
    ) -> Result<Option<WebhookIntegration>, RepositoryError> {
        let row = timed(
            "update_webhook_integration",
            sqlx::query_as::<_, WebhookIntegrationEntity>(
                r#"
                UPDATE webhook_integrations SET
                    name = COALESCE($3, name),
                    url = COALESCE($4, url),
                    events = COALESCE($5, events),
                    secret = COALESCE($6, secret),
                    is_active = COALESCE($7, is_active),
                    last_triggered_at = COALESCE($8, last_triggered_at),
                    last_status_code = COALESCE($9, last_status_code),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, name, url, events, secret, is_active,
                          last_triggered_at, last_status_code, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.name)
            .bind(&input.url)
            .bind(input.events.as_deref())
            .bind(&input.secret)
            .bind(input.is_active)
            .bind(input.last_triggered_at)
            .bind(input.last_status_code)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(row.map(WebhookIntegration::from))
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_webhook_integration",
            sqlx::query(
                "DELETE FROM webhook_integrations WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
