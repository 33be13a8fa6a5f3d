//! Subscription plan domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{default_currency, default_true};
use crate::repository::{LimitKind, Resource, Scoping};
use shared::validation::validate_not_blank;

text_enum!(
    BillingCycle, "billing cycle" {
        Monthly => "monthly",
        Yearly => "yearly",
    }
);

impl Default for BillingCycle {
    fn default() -> Self {
        BillingCycle::Monthly
    }
}

/// Plan domain model. Plans are shared by every tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub max_users: i32,
    pub max_sql_connections: i32,
    pub max_sql_queries: i32,
    pub max_templates: i32,
    pub max_schedulings: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Maximum number of records of `kind` a company on this plan may hold.
    pub fn limit_for(&self, kind: LimitKind) -> i32 {
        match kind {
            LimitKind::Users => self.max_users,
            LimitKind::SqlConnections => self.max_sql_connections,
            LimitKind::SqlQueries => self.max_sql_queries,
            LimitKind::Templates => self.max_templates,
            LimitKind::Schedulings => self.max_schedulings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: i64,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_users: i32,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_sql_connections: i32,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_sql_queries: i32,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_templates: i32,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_schedulings: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i64>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_users: Option<i32>,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_sql_connections: Option<i32>,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_sql_queries: Option<i32>,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_templates: Option<i32>,
    #[validate(range(min = 0, message = "Limits cannot be negative"))]
    pub max_schedulings: Option<i32>,
    pub is_active: Option<bool>,
}

impl Resource for Plan {
    type Create = CreatePlanRequest;
    type Update = UpdatePlanRequest;

    const LABEL: &'static str = "plan";
    const SCOPING: Scoping = Scoping::Global;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        None
    }

    fn prepare_create(
        input: &mut CreatePlanRequest,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), crate::services::ServiceError> {
        input.name = input.name.trim().to_string();
        input.currency = input.currency.to_uppercase();
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdatePlanRequest,
        _now: DateTime<Utc>,
    ) -> Result<(), crate::services::ServiceError> {
        if let Some(name) = input.name.as_mut() {
            *name = name.trim().to_string();
        }
        if let Some(currency) = input.currency.as_mut() {
            *currency = currency.to_uppercase();
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdatePlanRequest) -> bool {
        input.name.is_none()
            && input.description.is_none()
            && input.price_cents.is_none()
            && input.currency.is_none()
            && input.billing_cycle.is_none()
            && input.max_users.is_none()
            && input.max_sql_connections.is_none()
            && input.max_sql_queries.is_none()
            && input.max_templates.is_none()
            && input.max_schedulings.is_none()
            && input.is_active.is_none()
    }

    fn materialize(
        id: Uuid,
        _company_id: Option<Uuid>,
        input: &CreatePlanRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Plan {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            currency: input.currency.clone(),
            billing_cycle: input.billing_cycle,
            max_users: input.max_users,
            max_sql_connections: input.max_sql_connections,
            max_sql_queries: input.max_sql_queries,
            max_templates: input.max_templates,
            max_schedulings: input.max_schedulings,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdatePlanRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(description) = &input.description {
            self.description = Some(description.clone());
        }
        if let Some(price_cents) = input.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(currency) = &input.currency {
            self.currency = currency.clone();
        }
        if let Some(billing_cycle) = input.billing_cycle {
            self.billing_cycle = billing_cycle;
        }
        if let Some(max) = input.max_users {
            self.max_users = max;
        }
        if let Some(max) = input.max_sql_connections {
            self.max_sql_connections = max;
        }
        if let Some(max) = input.max_sql_queries {
            self.max_sql_queries = max;
        }
        if let Some(max) = input.max_templates {
            self.max_templates = max;
        }
        if let Some(max) = input.max_schedulings {
            self.max_schedulings = max;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePlanRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Plano Pro",
            "price_cents": 9900,
            "max_users": 10,
            "max_sql_connections": 3,
            "max_sql_queries": 5,
            "max_templates": 20,
            "max_schedulings": 50
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_from_json() {
        let req = request();
        assert_eq!(req.currency, "BRL");
        assert_eq!(req.billing_cycle, BillingCycle::Monthly);
        assert!(req.is_active);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut req = request();
        req.name = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_limits_rejected() {
        let mut req = request();
        req.max_sql_queries = -1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_limit_for_each_kind() {
        let plan = Plan::materialize(Uuid::new_v4(), None, &request(), Utc::now());
        assert_eq!(plan.limit_for(LimitKind::Users), 10);
        assert_eq!(plan.limit_for(LimitKind::SqlConnections), 3);
        assert_eq!(plan.limit_for(LimitKind::SqlQueries), 5);
        assert_eq!(plan.limit_for(LimitKind::Templates), 20);
        assert_eq!(plan.limit_for(LimitKind::Schedulings), 50);
    }

    #[test]
    fn test_plans_are_global() {
        let plan = Plan::materialize(Uuid::new_v4(), None, &request(), Utc::now());
        assert!(plan.visible_to(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_prepare_normalizes_currency() {
        let mut req = request();
        req.currency = "usd".into();
        Plan::prepare_create(&mut req, None, Utc::now()).unwrap();
        assert_eq!(req.currency, "USD");
    }
}
