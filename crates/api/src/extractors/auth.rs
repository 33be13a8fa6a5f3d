//! Bearer token and tenant selection extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::UserRole;
use domain::services::{TenantContext, TenantScope};
use shared::jwt::JwtError;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header a master user sets to act on one company.
pub const COMPANY_HEADER: &str = "X-Company-Id";

/// Caller identity taken from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Home company; `None` for master users.
    pub company_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn is_master(&self) -> bool {
        self.role.is_master()
    }

    pub fn require_master(&self) -> Result<(), ApiError> {
        if self.is_master() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Master access required".into()))
        }
    }

    pub fn require_user_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".into()))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = state.jwt.validate(token).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".into()),
            _ => ApiError::Unauthorized("Invalid or expired token".into()),
        })?;

        let user = CurrentUser {
            user_id: claims
                .user_id()
                .map_err(|_| ApiError::Unauthorized("Invalid token subject".into()))?,
            role: claims
                .role
                .parse()
                .map_err(|_| ApiError::Unauthorized("Invalid token role".into()))?,
            company_id: claims.company_id,
        };

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Authenticated caller plus the company context its request operates in.
///
/// Masters pick a company with [`COMPANY_HEADER`] and see every tenant
/// without it. Everyone else is pinned to their own company; a non-master
/// without a company gets [`TenantScope::Unselected`].
#[derive(Debug, Clone)]
pub struct Tenant {
    pub user: CurrentUser,
    pub ctx: TenantContext,
}

impl Tenant {
    pub fn company_id(&self) -> Option<Uuid> {
        self.ctx.scope.company_id()
    }

    /// Repository filter for direct reads; `None` when nothing is visible.
    pub fn filter(&self) -> Option<Option<Uuid>> {
        self.ctx.scope.filter()
    }
}

fn requested_company(parts: &Parts) -> Result<Option<Uuid>, ApiError> {
    match parts.headers.get(COMPANY_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|_| ApiError::Validation(format!("Invalid {} header", COMPANY_HEADER)))
            })
            .transpose(),
    }
}

/// Resolves the scope for `user` given the requested company, if any.
pub fn resolve_scope(
    user: &CurrentUser,
    requested: Option<Uuid>,
) -> Result<TenantScope, ApiError> {
    if user.is_master() {
        return Ok(requested.map_or(TenantScope::All, TenantScope::Company));
    }

    match (user.company_id, requested) {
        (Some(home), Some(requested)) if home != requested => Err(ApiError::Forbidden(
            "Cannot act on another company".into(),
        )),
        (Some(home), _) => Ok(TenantScope::Company(home)),
        (None, _) => Ok(TenantScope::Unselected),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let requested = requested_company(parts)?;
        let scope = resolve_scope(&user, requested)?;

        if user.is_master() {
            if let TenantScope::Company(company_id) = scope {
                state
                    .repos
                    .companies
                    .find(None, company_id)
                    .await?
                    .ok_or_else(|| ApiError::NotFound("Selected company not found".into()))?;
            }
        }

        Ok(Tenant {
            ctx: TenantContext::new(scope, Some(user.user_id)),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, company_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            role,
            company_id,
        }
    }

    #[test]
    fn test_master_without_header_sees_all() {
        let scope = resolve_scope(&user(UserRole::Master, None), None).unwrap();
        assert_eq!(scope, TenantScope::All);
    }

    #[test]
    fn test_master_selects_company() {
        let company = Uuid::new_v4();
        let scope = resolve_scope(&user(UserRole::Master, None), Some(company)).unwrap();
        assert_eq!(scope, TenantScope::Company(company));
    }

    #[test]
    fn test_member_is_pinned_to_home_company() {
        let home = Uuid::new_v4();
        let member = user(UserRole::User, Some(home));

        assert_eq!(resolve_scope(&member, None).unwrap(), TenantScope::Company(home));
        assert_eq!(
            resolve_scope(&member, Some(home)).unwrap(),
            TenantScope::Company(home)
        );
        assert!(matches!(
            resolve_scope(&member, Some(Uuid::new_v4())),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_member_without_company_is_unselected() {
        let scope = resolve_scope(&user(UserRole::Admin, None), None).unwrap();
        assert_eq!(scope, TenantScope::Unselected);
    }

    #[test]
    fn test_role_guards() {
        assert!(user(UserRole::Master, None).require_master().is_ok());
        assert!(user(UserRole::Admin, Some(Uuid::new_v4()))
            .require_master()
            .is_err());
        assert!(user(UserRole::Admin, Some(Uuid::new_v4()))
            .require_user_manager()
            .is_ok());
        assert!(user(UserRole::User, Some(Uuid::new_v4()))
            .require_user_manager()
            .is_err());
    }
}
