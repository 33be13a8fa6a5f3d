//! Company subscription to a plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repository::{Resource, Scoping};
use crate::services::ServiceError;

text_enum!(
    SubscriptionStatus, "subscription status" {
        Trialing => "trialing",
        Active => "active",
        PastDue => "past_due",
        Cancelled => "cancelled",
    }
);

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSubscriptionRequest {
    pub plan_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Resource for Subscription {
    type Create = CreateSubscriptionRequest;
    type Update = UpdateSubscriptionRequest;

    const LABEL: &'static str = "subscription";
    const SCOPING: Scoping = Scoping::Tenant;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateSubscriptionRequest,
        _company_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let started_at = *input.started_at.get_or_insert(now);
        if let Some(end) = input.current_period_end {
            if end <= started_at {
                return Err(ServiceError::validation(
                    "Period end must be after the start date",
                ));
            }
        }
        if input.status == SubscriptionStatus::Cancelled {
            input.cancelled_at = Some(now);
        }
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdateSubscriptionRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if input.status == Some(SubscriptionStatus::Cancelled) {
            input.cancelled_at = Some(now);
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateSubscriptionRequest) -> bool {
        input.plan_id.is_none() && input.status.is_none() && input.current_period_end.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSubscriptionRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Subscription {
            id,
            company_id: company_id.unwrap_or_default(),
            plan_id: input.plan_id,
            status: input.status,
            started_at: input.started_at.unwrap_or(now),
            current_period_end: input.current_period_end,
            cancelled_at: input.cancelled_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSubscriptionRequest, now: DateTime<Utc>) {
        if let Some(plan_id) = input.plan_id {
            self.plan_id = plan_id;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(end) = input.current_period_end {
            self.current_period_end = Some(end);
        }
        if let Some(at) = input.cancelled_at {
            self.cancelled_at = Some(at);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_start_defaults_to_now_and_period_checked() {
        let now = Utc::now();
        let mut req = CreateSubscriptionRequest {
            plan_id: Uuid::new_v4(),
            status: SubscriptionStatus::Trialing,
            started_at: None,
            current_period_end: Some(now + Duration::days(30)),
            cancelled_at: None,
        };
        Subscription::prepare_create(&mut req, None, now).unwrap();
        assert_eq!(req.started_at, Some(now));

        req.current_period_end = Some(now - Duration::days(1));
        assert!(Subscription::prepare_create(&mut req, None, now).is_err());
    }

    #[test]
    fn test_cancelling_stamps_cancelled_at() {
        let now = Utc::now();
        let mut update = UpdateSubscriptionRequest {
            status: Some(SubscriptionStatus::Cancelled),
            ..Default::default()
        };
        Subscription::prepare_update(&mut update, now).unwrap();
        assert_eq!(update.cancelled_at, Some(now));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::PastDue).unwrap(),
            "\"past_due\""
        );
        assert_eq!("past_due".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::PastDue);
    }
}
