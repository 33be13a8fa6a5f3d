//! SQL connection entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SqlConnection;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the sql_connections table.
#[derive(Debug, Clone, FromRow)]
pub struct SqlConnectionEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub db_type: String,
    pub host: String,
    pub port: i32,
    pub database_name: String,
    pub username: String,
    pub password: String,
    pub ssl_enabled: bool,
    pub status: String,
    pub last_tested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SqlConnectionEntity> for SqlConnection {
    type Error = RepositoryError;

    fn try_from(entity: SqlConnectionEntity) -> Result<Self, Self::Error> {
        Ok(SqlConnection {
            id: entity.id,
            company_id: entity.company_id,
            name: entity.name,
            db_type: parse_column("sql_connections", "db_type", &entity.db_type)?,
            host: entity.host,
            port: entity.port,
            database_name: entity.database_name,
            username: entity.username,
            password: entity.password,
            ssl_enabled: entity.ssl_enabled,
            status: parse_column("sql_connections", "status", &entity.status)?,
            last_tested_at: entity.last_tested_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
