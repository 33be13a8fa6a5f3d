//! Plan entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Plan;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the plans table.
#[derive(Debug, Clone, FromRow)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub billing_cycle: String,
    pub max_users: i32,
    pub max_sql_connections: i32,
    pub max_sql_queries: i32,
    pub max_templates: i32,
    pub max_schedulings: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlanEntity> for Plan {
    type Error = RepositoryError;

    fn try_from(entity: PlanEntity) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            price_cents: entity.price_cents,
            currency: entity.currency.trim().to_string(),
            billing_cycle: parse_column("plans", "billing_cycle", &entity.billing_cycle)?,
            max_users: entity.max_users,
            max_sql_connections: entity.max_sql_connections,
            max_sql_queries: entity.max_sql_queries,
            max_templates: entity.max_templates,
            max_schedulings: entity.max_schedulings,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::BillingCycle;

    #[test]
    fn test_entity_to_domain() {
        let plan = Plan::try_from(PlanEntity {
            id: Uuid::new_v4(),
            name: "Plano Pro".to_string(),
            description: None,
            price_cents: 9900,
            currency: "BRL".to_string(),
            billing_cycle: "yearly".to_string(),
            max_users: 10,
            max_sql_connections: 3,
            max_sql_queries: 5,
            max_templates: 20,
            max_schedulings: 50,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(plan.billing_cycle, BillingCycle::Yearly);
        assert_eq!(plan.max_sql_queries, 5);
    }
}
