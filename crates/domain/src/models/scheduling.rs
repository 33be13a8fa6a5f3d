//! Message scheduling domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repository::{LimitKind, Resource, Scoping};
use crate::services::ServiceError;
use shared::validation::{validate_future_timestamp, validate_not_blank};

text_enum!(
    Recurrence, "recurrence" {
        Once => "once",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
);

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::Once
    }
}

text_enum!(
    SchedulingStatus, "scheduling status" {
        Pending => "pending",
        Sent => "sent",
        Cancelled => "cancelled",
        Failed => "failed",
    }
);

/// A template send planned for a date, optionally fed by a SQL query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduling {
    pub id: Uuid,
    pub company_id: Uuid,
    pub template_id: Uuid,
    pub query_id: Option<Uuid>,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub status: SchedulingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scheduling {
    pub fn can_cancel(&self) -> bool {
        self.status == SchedulingStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSchedulingRequest {
    pub template_id: Uuid,
    pub query_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSchedulingRequest {
    pub template_id: Option<Uuid>,
    pub query_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub recurrence: Option<Recurrence>,
    pub status: Option<SchedulingStatus>,
}

impl UpdateSchedulingRequest {
    pub fn cancel() -> Self {
        Self {
            status: Some(SchedulingStatus::Cancelled),
            ..Default::default()
        }
    }
}

fn ensure_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ServiceError> {
    validate_future_timestamp(scheduled_at, now)
        .map_err(|_| ServiceError::validation("Scheduled date must be in the future"))
}

impl Resource for Scheduling {
    type Create = CreateSchedulingRequest;
    type Update = UpdateSchedulingRequest;

    const LABEL: &'static str = "scheduling";
    const SCOPING: Scoping = Scoping::Tenant;
    const LIMIT: Option<LimitKind> = Some(LimitKind::Schedulings);

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateSchedulingRequest,
        _company_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        ensure_future(input.scheduled_at, now)
    }

    fn prepare_update(
        input: &mut UpdateSchedulingRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        match input.scheduled_at {
            Some(scheduled_at) => ensure_future(scheduled_at, now),
            None => Ok(()),
        }
    }

    fn is_noop_update(input: &UpdateSchedulingRequest) -> bool {
        input.template_id.is_none()
            && input.query_id.is_none()
            && input.name.is_none()
            && input.scheduled_at.is_none()
            && input.recurrence.is_none()
            && input.status.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSchedulingRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Scheduling {
            id,
            company_id: company_id.unwrap_or_default(),
            template_id: input.template_id,
            query_id: input.query_id,
            name: input.name.clone(),
            scheduled_at: input.scheduled_at,
            recurrence: input.recurrence,
            status: SchedulingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSchedulingRequest, now: DateTime<Utc>) {
        if let Some(template_id) = input.template_id {
            self.template_id = template_id;
        }
        if let Some(query_id) = input.query_id {
            self.query_id = Some(query_id);
        }
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(scheduled_at) = input.scheduled_at {
            self.scheduled_at = scheduled_at;
        }
        if let Some(recurrence) = input.recurrence {
            self.recurrence = recurrence;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(scheduled_at: DateTime<Utc>) -> CreateSchedulingRequest {
        CreateSchedulingRequest {
            template_id: Uuid::new_v4(),
            query_id: None,
            name: "Campanha de natal".into(),
            scheduled_at,
            recurrence: Recurrence::Once,
        }
    }

    #[test]
    fn test_past_date_rejected() {
        let now = Utc::now();
        let mut req = request(now - Duration::hours(1));
        let err = Scheduling::prepare_create(&mut req, None, now).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation("Scheduled date must be in the future".into())
        );
    }

    #[test]
    fn test_future_date_accepted() {
        let now = Utc::now();
        let mut req = request(now + Duration::days(2));
        assert!(Scheduling::prepare_create(&mut req, None, now).is_ok());
    }

    #[test]
    fn test_rescheduling_to_past_rejected() {
        let now = Utc::now();
        let mut update = UpdateSchedulingRequest {
            scheduled_at: Some(now - Duration::minutes(5)),
            ..Default::default()
        };
        assert!(Scheduling::prepare_update(&mut update, now).is_err());
    }

    #[test]
    fn test_new_schedulings_are_pending_and_cancellable() {
        let now = Utc::now();
        let mut s = Scheduling::materialize(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            &request(now + Duration::hours(3)),
            now,
        );
        assert_eq!(s.status, SchedulingStatus::Pending);
        assert!(s.can_cancel());

        s.apply_update(&UpdateSchedulingRequest::cancel(), now);
        assert_eq!(s.status, SchedulingStatus::Cancelled);
        assert!(!s.can_cancel());
    }
}
