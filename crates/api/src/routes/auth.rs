//! Authentication routes: password login and the current user.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use domain::models::{UpdateUserRequest, User};
use serde::{Deserialize, Serialize};
use shared::password::verify_password;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response body for successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".into())
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
///
/// Attempts are throttled per client address and per email. Inactive users
/// and users of inactive companies cannot log in.
pub async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;
    let email = request.email.trim().to_lowercase();

    if let Some(limiter) = &state.login_limiter {
        let ip_key = connect_info
            .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
            .unwrap_or_else(|| "ip:unknown".to_string());
        let email_key = format!("email:{}", email);
        if let Err(retry_after) = limiter.check_all([ip_key.as_str(), email_key.as_str()]) {
            warn!(email = %email, retry_after, "Login rate limited");
            return Err(ApiError::RateLimited);
        }
    }

    let user = state
        .repos
        .user_directory
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let valid = verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid_credentials());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("User is inactive".into()));
    }

    if let Some(company_id) = user.company_id {
        let company = state.repos.companies.find(None, company_id).await?;
        if !company.map_or(false, |c| c.is_active()) {
            return Err(ApiError::Forbidden("Company is not active".into()));
        }
    }

    let (access_token, _jti) = state
        .jwt
        .issue(user.id, user.role.as_str(), user.company_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .repos
        .users
        .update(None, user.id, &UpdateUserRequest::logged_in(Utc::now()))
        .await?
        .unwrap_or(user);

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_token_expiry_secs,
        user,
    }))
}

/// Get the authenticated user.
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<User>, ApiError> {
    state
        .repos
        .users
        .find(None, current.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}
