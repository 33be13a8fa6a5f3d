//! System log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SystemLog;
use domain::repository::RepositoryError;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the system_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct SystemLogEntity {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub level: String,
    pub source: String,
    pub message: String,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SystemLogEntity> for SystemLog {
    type Error = RepositoryError;

    fn try_from(entity: SystemLogEntity) -> Result<Self, Self::Error> {
        Ok(SystemLog {
            id: entity.id,
            company_id: entity.company_id,
            user_id: entity.user_id,
            level: parse_column("system_logs", "level", &entity.level)?,
            source: entity.source,
            message: entity.message,
            details: entity.details,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::LogLevel;

    #[test]
    fn test_entity_to_domain() {
        let log = SystemLog::try_from(SystemLogEntity {
            id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            user_id: None,
            level: "warning".to_string(),
            source: "SQL query".to_string(),
            message: "Plan limit reached".to_string(),
            details: serde_json::json!({"max": 5}),
            created_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(log.level, LogLevel::Warning);
        assert_eq!(log.details["max"], 5);
    }
}
