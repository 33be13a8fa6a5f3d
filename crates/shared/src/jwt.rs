//! Access token utilities (HS256).
//!
//! Tokens carry the user's role and home company so that tenant scoping can
//! be resolved without a database round trip on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role name (master, admin, user)
    pub role: String,
    /// Home company of the user; absent for master users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Signing/verification configuration.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub access_token_expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn new(secret: &str, access_token_expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues an access token. Returns `(token, jti)`.
    pub fn issue(
        &self,
        user_id: Uuid,
        role: &str,
        company_id: Option<Uuid>,
    ) -> Result<(String, String), JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            company_id,
            exp: (now + Duration::seconds(self.access_token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;
        Ok((token, jti))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_jwt_testing_12345";

    fn config() -> JwtConfig {
        JwtConfig::new(SECRET, 3600, 0).unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            JwtConfig::new("short", 3600, 0),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_issue_and_validate() {
        let cfg = config();
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();

        let (token, jti) = cfg.issue(user_id, "admin", Some(company_id)).unwrap();
        let claims = cfg.validate(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.company_id, Some(company_id));
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_master_token_has_no_company() {
        let cfg = config();
        let (token, _) = cfg.issue(Uuid::new_v4(), "master", None).unwrap();
        assert!(cfg.validate(&token).unwrap().company_id.is_none());
    }

    #[test]
    fn test_expired_token() {
        let cfg = JwtConfig::new(SECRET, -120, 0).unwrap();
        let (token, _) = cfg.issue(Uuid::new_v4(), "user", None).unwrap();
        assert!(matches!(cfg.validate(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let (token, _) = config().issue(Uuid::new_v4(), "user", None).unwrap();
        let other = JwtConfig::new("another_secret_key_that_is_long_enough", 3600, 0).unwrap();
        assert!(matches!(other.validate(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        assert!(config().validate("not_a_jwt").is_err());
    }

    #[test]
    fn test_invalid_subject() {
        let claims = Claims {
            sub: "nope".into(),
            role: "user".into(),
            company_id: None,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(matches!(claims.user_id(), Err(JwtError::InvalidToken)));
    }
}
