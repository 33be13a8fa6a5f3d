//! Global key/value system configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::repository::{Resource, Scoping};

lazy_static::lazy_static! {
    static ref CONFIG_KEY_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9_.]+$").unwrap();
}

fn validate_config_key(key: &str) -> Result<(), ValidationError> {
    if CONFIG_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        let mut err = ValidationError::new("config_key_format");
        err.message =
            Some("Key must contain only lowercase letters, digits, dots and underscores".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub id: Uuid,
    pub key: String,
    pub value: JsonValue,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSystemConfigRequest {
    #[validate(length(min = 1, max = 100, message = "Key must be 1-100 characters"))]
    #[validate(custom(function = "validate_config_key"))]
    pub key: String,
    pub value: JsonValue,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSystemConfigRequest {
    pub value: Option<JsonValue>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Resource for SystemConfig {
    type Create = CreateSystemConfigRequest;
    type Update = UpdateSystemConfigRequest;

    const LABEL: &'static str = "system configuration";
    const SCOPING: Scoping = Scoping::Global;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        None
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }

    fn is_noop_update(input: &UpdateSystemConfigRequest) -> bool {
        input.value.is_none() && input.description.is_none()
    }

    fn materialize(
        id: Uuid,
        _company_id: Option<Uuid>,
        input: &CreateSystemConfigRequest,
        now: DateTime<Utc>,
    ) -> Self {
        SystemConfig {
            id,
            key: input.key.clone(),
            value: input.value.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSystemConfigRequest, now: DateTime<Utc>) {
        if let Some(value) = &input.value {
            self.value = value.clone();
        }
        if let Some(description) = &input.description {
            self.description = Some(description.clone());
        }
        self.updated_at = now;
    }
}
