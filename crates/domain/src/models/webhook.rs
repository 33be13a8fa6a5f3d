//! Outbound webhook integration domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::default_true;
use crate::repository::{Resource, Scoping};
use crate::services::ServiceError;
use shared::validation::validate_not_blank;

/// Events a webhook may subscribe to.
pub const SUPPORTED_EVENTS: &[&str] = &[
    "message.sent",
    "message.failed",
    "scheduling.created",
    "scheduling.completed",
    "query.executed",
    "connection.status",
];

fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("url_scheme");
        err.message = Some("URL must use http or https".into());
        Err(err)
    }
}

fn validate_events(events: &[String]) -> Result<(), ValidationError> {
    match events.iter().find(|e| !SUPPORTED_EVENTS.contains(&e.as_str())) {
        Some(_) => {
            let mut err = ValidationError::new("unknown_event");
            err.message = Some("Unsupported event".into());
            Err(err)
        }
        None => Ok(()),
    }
}

fn normalize_events(events: &mut Vec<String>) {
    events.sort();
    events.dedup();
}

/// Webhook called when subscribed events happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookIntegration {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub url: String,
    pub events: Vec<String>,
    #[serde(skip_serializing, default)]
    pub secret: Option<String>,
    pub is_active: bool,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub last_status_code: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebhookIntegration {
    pub fn subscribes_to(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWebhookRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(url(message = "Invalid URL"))]
    #[validate(custom(function = "validate_webhook_url"))]
    pub url: String,
    #[validate(length(min = 1, message = "At least one event is required"))]
    #[validate(custom(function = "validate_events"))]
    pub events: Vec<String>,
    #[serde(skip_serializing)]
    #[validate(length(min = 16, max = 256, message = "Secret must be 16-256 characters"))]
    pub secret: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWebhookRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(url(message = "Invalid URL"))]
    #[validate(custom(function = "validate_webhook_url"))]
    pub url: Option<String>,
    #[validate(length(min = 1, message = "At least one event is required"))]
    #[validate(custom(function = "validate_events"))]
    pub events: Option<Vec<String>>,
    #[serde(skip_serializing)]
    #[validate(length(min = 16, max = 256, message = "Secret must be 16-256 characters"))]
    pub secret: Option<String>,
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub last_triggered_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub last_status_code: Option<i32>,
}

impl UpdateWebhookRequest {
    /// Records a delivery attempt; `status_code` is absent when no response arrived.
    pub fn triggered(at: DateTime<Utc>, status_code: Option<i32>) -> Self {
        Self {
            last_triggered_at: Some(at),
            last_status_code: status_code,
            ..Default::default()
        }
    }
}

impl Resource for WebhookIntegration {
    type Create = CreateWebhookRequest;
    type Update = UpdateWebhookRequest;

    const LABEL: &'static str = "webhook";
    const SCOPING: Scoping = Scoping::Tenant;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateWebhookRequest,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        normalize_events(&mut input.events);
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdateWebhookRequest,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if let Some(events) = input.events.as_mut() {
            normalize_events(events);
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateWebhookRequest) -> bool {
        input.name.is_none()
            && input.url.is_none()
            && input.events.is_none()
            && input.secret.is_none()
            && input.is_active.is_none()
            && input.last_triggered_at.is_none()
            && input.last_status_code.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateWebhookRequest,
        now: DateTime<Utc>,
    ) -> Self {
        WebhookIntegration {
            id,
            company_id: company_id.unwrap_or_default(),
            name: input.name.clone(),
            url: input.url.clone(),
            events: input.events.clone(),
            secret: input.secret.clone(),
            is_active: input.is_active,
            last_triggered_at: None,
            last_status_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateWebhookRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(url) = &input.url {
            self.url = url.clone();
        }
        if let Some(events) = &input.events {
            self.events = events.clone();
        }
        if let Some(secret) = &input.secret {
            self.secret = Some(secret.clone());
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        if let Some(at) = input.last_triggered_at {
            self.last_triggered_at = Some(at);
        }
        if let Some(code) = input.last_status_code {
            self.last_status_code = Some(code);
        }
        self.updated_at = now;
    }
}
