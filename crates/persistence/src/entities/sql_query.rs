//! SQL query entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SqlQuery;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the sql_queries table.
#[derive(Debug, Clone, FromRow)]
pub struct SqlQueryEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub connection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub query_text: String,
    pub is_active: bool,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SqlQueryEntity> for SqlQuery {
    fn from(entity: SqlQueryEntity) -> Self {
        SqlQuery {
            id: entity.id,
            company_id: entity.company_id,
            connection_id: entity.connection_id,
            name: entity.name,
            description: entity.description,
            query_text: entity.query_text,
            is_active: entity.is_active,
            last_executed_at: entity.last_executed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
