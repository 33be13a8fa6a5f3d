//! SMTP server configuration domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::repository::{Resource, Scoping};
use shared::validation::{validate_host, validate_not_blank};

fn default_smtp_port() -> i32 {
    587
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub id: Uuid,
    pub company_id: Uuid,
    pub host: String,
    pub port: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SmtpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSmtpConfigRequest {
    #[validate(custom(function = "validate_host"))]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: i32,
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
    #[validate(email(message = "Invalid sender email"))]
    pub from_email: String,
    #[validate(length(max = 255, message = "Sender name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub from_name: String,
    #[serde(default = "default_true")]
    pub use_tls: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSmtpConfigRequest {
    #[validate(custom(function = "validate_host"))]
    pub host: Option<String>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 1024, message = "Password cannot be empty"))]
    pub password: Option<String>,
    #[validate(email(message = "Invalid sender email"))]
    pub from_email: Option<String>,
    #[validate(length(max = 255, message = "Sender name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub from_name: Option<String>,
    pub use_tls: Option<bool>,
    pub is_active: Option<bool>,
}

impl Resource for SmtpConfig {
    type Create = CreateSmtpConfigRequest;
    type Update = UpdateSmtpConfigRequest;

    const LABEL: &'static str = "SMTP configuration";
    const SCOPING: Scoping = Scoping::Tenant;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn is_noop_update(input: &UpdateSmtpConfigRequest) -> bool {
        input.host.is_none()
            && input.port.is_none()
            && input.username.is_none()
            && input.password.is_none()
            && input.from_email.is_none()
            && input.from_name.is_none()
            && input.use_tls.is_none()
            && input.is_active.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSmtpConfigRequest,
        now: DateTime<Utc>,
    ) -> Self {
        SmtpConfig {
            id,
            company_id: company_id.unwrap_or_default(),
            host: input.host.clone(),
            port: input.port,
            username: input.username.clone(),
            password: input.password.clone(),
            from_email: input.from_email.clone(),
            from_name: input.from_name.clone(),
            use_tls: input.use_tls,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSmtpConfigRequest, now: DateTime<Utc>) {
        if let Some(host) = &input.host {
            self.host = host.clone();
        }
        if let Some(port) = input.port {
            self.port = port;
        }
        if let Some(username) = &input.username {
            self.username = username.clone();
        }
        if let Some(password) = &input.password {
            self.password = password.clone();
        }
        if let Some(from_email) = &input.from_email {
            self.from_email = from_email.clone();
        }
        if let Some(from_name) = &input.from_name {
            self.from_name = from_name.clone();
        }
        if let Some(use_tls) = input.use_tls {
            self.use_tls = use_tls;
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

    #[test]
    fn test_defaults_and_masking() {
        let req: CreateSmtpConfigRequest = serde_json::from_value(serde_json::json!({
            "host": "smtp.example.com",
            "username": "mailer",
            "password": "hunter2-hunter2",
            "from_email": "no-reply@example.com",
            "from_name": "Acme"
        }))
        .unwrap();
        assert_eq!(req.port, 587);
        assert!(req.use_tls);
        assert!(req.validate().is_ok());

        let config = SmtpConfig::materialize(Uuid::new_v4(), Some(Uuid::new_v4()), &req, Utc::now());
        assert_eq!(config.address(), "smtp.example.com:587");
        assert!(!serde_json::to_string(&config).unwrap().contains("hunter2"));
    }

    #[test]
    fn test_invalid_sender_rejected() {
        let update = UpdateSmtpConfigRequest {
            from_email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
