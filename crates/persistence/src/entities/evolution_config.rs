//! Evolution API configuration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::EvolutionConfig;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the evolution_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct EvolutionConfigEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub api_url: String,
    pub api_key: String,
    pub instance_name: String,
    pub webhook_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EvolutionConfigEntity> for EvolutionConfig {
    fn from(entity: EvolutionConfigEntity) -> Self {
        EvolutionConfig {
            id: entity.id,
            company_id: entity.company_id,
            api_url: entity.api_url,
            api_key: entity.api_key,
            instance_name: entity.instance_name,
            webhook_url: entity.webhook_url,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
