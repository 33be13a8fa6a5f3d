//! Repository for message template database operations.

use async_trait::async_trait;
use domain::models::{CreateTemplateRequest, MessageTemplate, UpdateTemplateRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::MessageTemplateEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct MessageTemplateRepository {
    pool: PgPool,
}

impl MessageTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<MessageTemplate> for MessageTemplateRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<MessageTemplate>, RepositoryError> {
        let rows = timed(
            "list_message_templates",
            sqlx::query_as::<_, MessageTemplateEntity>(
                r#"
                SELECT id, company_id, name, content, variables, category, is_active,
                       created_at, updated_at
                FROM message_templates
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(MessageTemplate::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<MessageTemplate>, RepositoryError> {
        let row = timed(
            "find_message_template",
            sqlx::query_as::<_, MessageTemplateEntity>(
                r#"
                SELECT id, company_id, name, content, variables, category, is_active,
                       created_at, updated_at
                FROM message_templates
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(MessageTemplate::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_message_templates",
            sqlx::query_as("SELECT COUNT(*) FROM message_templates WHERE company_id = $1")
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
        input: &CreateTemplateRequest,
    ) -> Result<MessageTemplate, RepositoryError> {
        let row = timed(
            "create_message_template",
            sqlx::query_as::<_, MessageTemplateEntity>(
                r#"
                INSERT INTO message_templates (id, company_id, name, content, variables,
                                               category, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, name, content, variables, category, is_active,
                          created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(&input.name)
            .bind(&input.content)
            .bind(&input.variables)
            .bind(input.category.as_str())
            .bind(input.is_active)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        MessageTemplate::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateTemplateRequest,
    ) -> Result<Option<MessageTemplate>, RepositoryError> {
        let row = timed(
            "update_message_template",
            sqlx::query_as::<_, MessageTemplateEntity>(
                r#"
                UPDATE message_templates SET
                    name = COALESCE($3, name),
                    content = COALESCE($4, content),
                    variables = COALESCE($5, variables),
                    category = COALESCE($6, category),
                    is_active = COALESCE($7, is_active),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, name, content, variables, category, is_active,
                          created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.name)
            .bind(&input.content)
            .bind(&input.variables)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.is_active)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(MessageTemplate::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_message_template",
            sqlx::query(
                "DELETE FROM message_templates WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
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
