//! Evolution API (WhatsApp gateway) configuration.
//!
//! A company has at most one configuration. The gateway itself is an opaque
//! HTTP collaborator; only its connection state and text sending are used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::repository::{Resource, Scoping};
use crate::services::ServiceError;
use shared::validation::{validate_not_blank, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub id: Uuid,
    pub company_id: Uuid,
    pub api_url: String,
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub instance_name: String,
    pub webhook_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvolutionConfig {
    /// Absolute URL of a gateway endpoint for this instance.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_matches('/'),
            self.instance_name
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEvolutionConfigRequest {
    #[validate(url(message = "Invalid API URL"))]
    pub api_url: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 512, message = "API key is required"))]
    pub api_key: String,
    #[validate(length(max = 100, message = "Instance name must be at most 100 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub instance_name: String,
    #[validate(url(message = "Invalid webhook URL"))]
    pub webhook_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEvolutionConfigRequest {
    #[validate(url(message = "Invalid API URL"))]
    pub api_url: Option<String>,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 512, message = "API key cannot be empty"))]
    pub api_key: Option<String>,
    #[validate(length(max = 100, message = "Instance name must be at most 100 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub instance_name: Option<String>,
    #[validate(url(message = "Invalid webhook URL"))]
    pub webhook_url: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateEvolutionConfigRequest> for UpdateEvolutionConfigRequest {
    fn from(req: CreateEvolutionConfigRequest) -> Self {
        Self {
            api_url: Some(req.api_url),
            api_key: Some(req.api_key),
            instance_name: Some(req.instance_name),
            webhook_url: req.webhook_url,
            is_active: Some(req.is_active),
        }
    }
}

/// Text message sent through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendTextRequest {
    #[validate(custom(function = "validate_phone"))]
    pub number: String,
    #[validate(length(max = 4096, message = "Text must be at most 4096 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

/// Connection state reported by the gateway for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub instance: String,
    pub state: String,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        self.state.eq_ignore_ascii_case("open")
    }
}

impl Resource for EvolutionConfig {
    type Create = CreateEvolutionConfigRequest;
    type Update = UpdateEvolutionConfigRequest;

    const LABEL: &'static str = "Evolution API configuration";
    const SCOPING: Scoping = Scoping::Tenant;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.company_id.to_string())
    }

    fn prepare_create(
        input: &mut CreateEvolutionConfigRequest,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        input.api_url = input.api_url.trim_end_matches('/').to_string();
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdateEvolutionConfigRequest,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if let Some(url) = input.api_url.as_mut() {
            *url = url.trim_end_matches('/').to_string();
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateEvolutionConfigRequest) -> bool {
        input.api_url.is_none()
            && input.api_key.is_none()
            && input.instance_name.is_none()
            && input.webhook_url.is_none()
            && input.is_active.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateEvolutionConfigRequest,
        now: DateTime<Utc>,
    ) -> Self {
        EvolutionConfig {
            id,
            company_id: company_id.unwrap_or_default(),
            api_url: input.api_url.clone(),
            api_key: input.api_key.clone(),
            instance_name: input.instance_name.clone(),
            webhook_url: input.webhook_url.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateEvolutionConfigRequest, now: DateTime<Utc>) {
        if let Some(api_url) = &input.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(api_key) = &input.api_key {
            self.api_key = api_key.clone();
        }
        if let Some(instance_name) = &input.instance_name {
            self.instance_name = instance_name.clone();
        }
        if let Some(webhook_url) = &input.webhook_url {
            self.webhook_url = Some(webhook_url.clone());
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}
