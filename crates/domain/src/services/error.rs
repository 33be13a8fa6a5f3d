use thiserror::Error;

use crate::repository::RepositoryError;

/// Errors returned by resource services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Plan limit reached: at most {max} {resource}")]
    LimitReached { resource: &'static str, max: i32 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(label: &str) -> Self {
        ServiceError::NotFound(capitalize(label))
    }

    /// Whether the failure was caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ServiceError::Internal(_)
                | ServiceError::Repository(RepositoryError::Unavailable(_))
                | ServiceError::Repository(RepositoryError::Corrupt(_))
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            ServiceError::Validation("Invalid input".to_string())
        } else {
            ServiceError::Validation(messages.join("; "))
        }
    }
}

/// Upper-cases the first character of a resource label.
pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_errors_carry_field_and_message() {
        let err: ServiceError = Sample {
            name: String::new(),
        }
        .validate()
        .unwrap_err()
        .into();

        assert_eq!(err, ServiceError::Validation("name: Name is required".into()));
    }

    #[test]
    fn test_limit_reached_display() {
        let err = ServiceError::LimitReached {
            resource: "SQL queries",
            max: 5,
        };
        assert_eq!(err.to_string(), "Plan limit reached: at most 5 SQL queries");
    }

    #[test]
    fn test_not_found_capitalizes_label() {
        assert_eq!(
            ServiceError::not_found("SQL connection").to_string(),
            "SQL connection not found"
        );
        assert_eq!(ServiceError::not_found("plan").to_string(), "Plan not found");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ServiceError::validation("bad").is_client_error());
        assert!(ServiceError::Repository(RepositoryError::Conflict("x".into())).is_client_error());
        assert!(!ServiceError::Repository(RepositoryError::Unavailable("down".into()))
            .is_client_error());
        assert!(!ServiceError::Internal("boom".into()).is_client_error());
    }
}
