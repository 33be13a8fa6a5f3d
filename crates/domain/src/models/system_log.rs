//! System log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::repository::{Resource, Scoping};
use shared::validation::validate_not_blank;

text_enum!(
    /// Severity of a log entry; also the level of a notification.
    LogLevel, "log level" {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

/// Audit entry. Logs are append-only: they can be listed, created and deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemLog {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSystemLogRequest {
    #[serde(default)]
    pub level: LogLevel,
    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: String,
    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub message: String,
    #[serde(default)]
    pub details: JsonValue,
    #[serde(skip)]
    pub user_id: Option<Uuid>,
}

/// Update payload for resources that cannot be modified.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NoUpdate {}

impl Validate for NoUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Resource for SystemLog {
    type Create = CreateSystemLogRequest;
    type Update = NoUpdate;

    const LABEL: &'static str = "system log";
    const SCOPING: Scoping = Scoping::OptionalTenant;
    const NOTIFY_SUCCESS: bool = false;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }

    fn is_noop_update(_input: &NoUpdate) -> bool {
        true
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSystemLogRequest,
        now: DateTime<Utc>,
    ) -> Self {
        SystemLog {
            id,
            company_id,
            user_id: input.user_id,
            level: input.level,
            source: input.source.clone(),
            message: input.message.clone(),
            details: input.details.clone(),
            created_at: now,
        }
    }

    fn apply_update(&mut self, _input: &NoUpdate, _now: DateTime<Utc>) {}
}
