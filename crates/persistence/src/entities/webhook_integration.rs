//! Webhook integration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::WebhookIntegration;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the webhook_integrations table.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookIntegrationEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub url: String,
    pub events: Vec<String>,
    pub secret: Option<String>,
    pub is_active: bool,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub last_status_code: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WebhookIntegrationEntity> for WebhookIntegration {
    fn from(entity: WebhookIntegrationEntity) -> Self {
        WebhookIntegration {
            id: entity.id,
            company_id: entity.company_id,
            name: entity.name,
            url: entity.url,
            events: entity.events,
            secret: entity.secret,
            is_active: entity.is_active,
            last_triggered_at: entity.last_triggered_at,
            last_status_code: entity.last_status_code,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
