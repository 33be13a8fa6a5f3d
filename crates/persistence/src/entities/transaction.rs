//! Transaction entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Transaction;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the transactions table.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionEntity> for Transaction {
    type Error = RepositoryError;

    fn try_from(entity: TransactionEntity) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: entity.id,
            company_id: entity.company_id,
            subscription_id: entity.subscription_id,
            amount_cents: entity.amount_cents,
            currency: entity.currency.trim().to_string(),
            status: parse_column("transactions", "status", &entity.status)?,
            payment_method: entity.payment_method,
            description: entity.description,
            paid_at: entity.paid_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
