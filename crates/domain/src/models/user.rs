//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::repository::{LimitKind, Resource, Scoping};
use crate::services::ServiceError;
use shared::password::hash_password;
use shared::validation::validate_not_blank;

text_enum!(
    UserRole, "user role" {
        Master => "master",
        Admin => "admin",
        User => "user",
    }
);

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl UserRole {
    pub fn is_master(&self) -> bool {
        matches!(self, UserRole::Master)
    }

    /// Masters manage every user; admins manage the users of their company.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Master | UserRole::Admin)
    }
}

/// Application user. Master users have no company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub company_id: Option<Uuid>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    #[serde(skip_serializing)]
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    #[serde(skip)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UpdateUserRequest {
    pub fn logged_in(at: DateTime<Utc>) -> Self {
        Self {
            last_login_at: Some(at),
            ..Default::default()
        }
    }
}

impl User {
    /// Masters never belong to a company and everyone else always does, so a
    /// role change may not cross that line.
    pub fn check_role_change(&self, role: UserRole) -> Result<(), ServiceError> {
        if role.is_master() != self.role.is_master() {
            return Err(ServiceError::validation(
                "Cannot move a user between the master role and a company role",
            ));
        }
        Ok(())
    }
}

impl Resource for User {
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    const LABEL: &'static str = "user";
    const SCOPING: Scoping = Scoping::OptionalTenant;
    const LIMIT: Option<LimitKind> = Some(LimitKind::Users);

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }

    fn requested_company(input: &CreateUserRequest) -> Option<Uuid> {
        input.company_id
    }

    fn prepare_create(
        input: &mut CreateUserRequest,
        company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        match (input.role, company_id) {
            (UserRole::Master, Some(_)) => {
                return Err(ServiceError::validation(
                    "Master users cannot belong to a company",
                ))
            }
            (UserRole::Admin | UserRole::User, None) => {
                return Err(ServiceError::validation("Select a company first"))
            }
            _ => {}
        }

        input.company_id = company_id;
        input.email = input.email.trim().to_lowercase();
        input.password_hash = hash_password(&input.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        input.password.clear();
        Ok(())
    }

    fn prepare_update(input: &mut UpdateUserRequest, _now: DateTime<Utc>) -> Result<(), ServiceError> {
        if let Some(password) = input.password.take() {
            input.password_hash =
                Some(hash_password(&password).map_err(|e| ServiceError::Internal(e.to_string()))?);
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateUserRequest) -> bool {
        input.name.is_none()
            && input.role.is_none()
            && input.is_active.is_none()
            && input.password.is_none()
            && input.password_hash.is_none()
            && input.last_login_at.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateUserRequest,
        now: DateTime<Utc>,
    ) -> Self {
        User {
            id,
            company_id,
            email: input.email.clone(),
            name: input.name.clone(),
            role: input.role,
            is_active: input.is_active,
            password_hash: input.password_hash.clone(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateUserRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(role) = input.role {
            self.role = role;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        if let Some(hash) = &input.password_hash {
            self.password_hash = hash.clone();
        }
        if let Some(at) = input.last_login_at {
            self.last_login_at = Some(at);
        }
        self.updated_at = now;
    }
}
