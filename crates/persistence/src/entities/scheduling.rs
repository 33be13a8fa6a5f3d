//! Scheduling entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Scheduling;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the schedulings table.
#[derive(Debug, Clone, FromRow)]
pub struct SchedulingEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub template_id: Uuid,
    pub query_id: Option<Uuid>,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub recurrence: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SchedulingEntity> for Scheduling {
    type Error = RepositoryError;

    fn try_from(entity: SchedulingEntity) -> Result<Self, Self::Error> {
        Ok(Scheduling {
            id: entity.id,
            company_id: entity.company_id,
            template_id: entity.template_id,
            query_id: entity.query_id,
            name: entity.name,
            scheduled_at: entity.scheduled_at,
            recurrence: parse_column("schedulings", "recurrence", &entity.recurrence)?,
            status: parse_column("schedulings", "status", &entity.status)?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
