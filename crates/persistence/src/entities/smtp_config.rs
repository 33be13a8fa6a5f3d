//! SMTP configuration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SmtpConfig;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the smtp_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct SmtpConfigEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SmtpConfigEntity> for SmtpConfig {
    fn from(entity: SmtpConfigEntity) -> Self {
        SmtpConfig {
            id: entity.id,
            company_id: entity.company_id,
            host: entity.host,
            port: entity.port,
            username: entity.username,
            password: entity.password,
            from_email: entity.from_email,
            from_name: entity.from_name,
            use_tls: entity.use_tls,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
