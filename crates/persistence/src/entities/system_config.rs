//! System configuration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SystemConfig;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the system_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct SystemConfigEntity {
    pub id: Uuid,
    pub key: String,
    pub value: JsonValue,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SystemConfigEntity> for SystemConfig {
    fn from(entity: SystemConfigEntity) -> Self {
        SystemConfig {
            id: entity.id,
            key: entity.key,
            value: entity.value,
            description: entity.description,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
