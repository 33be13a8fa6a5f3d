//! Subscription entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Subscription;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionEntity> for Subscription {
    type Error = RepositoryError;

    fn try_from(entity: SubscriptionEntity) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: entity.id,
            company_id: entity.company_id,
            plan_id: entity.plan_id,
            status: parse_column("subscriptions", "status", &entity.status)?,
            started_at: entity.started_at,
            current_period_end: entity.current_period_end,
            cancelled_at: entity.cancelled_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
