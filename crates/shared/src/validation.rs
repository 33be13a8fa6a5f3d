//! Common validation utilities.
//!
//! The functions returning `ValidationError` plug directly into
//! `#[validate(custom(function = "..."))]` attributes.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use validator::ValidationError;

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: regex::Regex =
        regex::Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_\.]*)\s*\}\}").unwrap();
    static ref HOSTNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9\-\.]{0,251}[A-Za-z0-9])?$").unwrap();
    static ref PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[0-9]{8,15}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Field is required"))
    } else {
        Ok(())
    }
}

/// Accepts only timestamps strictly after `now`.
pub fn validate_future_timestamp(
    value: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if value > now {
        Ok(())
    } else {
        Err(error("past_timestamp", "Date must be in the future"))
    }
}

/// Validates a DNS host name or IPv4/IPv6 literal.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.parse::<std::net::IpAddr>().is_ok() || HOSTNAME_REGEX.is_match(host) {
        Ok(())
    } else {
        Err(error("host_format", "Invalid host name"))
    }
}

/// Validates a phone number in E.164-ish format (digits only, optional leading +).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(error(
            "phone_format",
            "Phone must contain 8 to 15 digits with an optional leading +",
        ))
    }
}

/// Extracts the distinct `{{placeholder}}` names of a template body, sorted.
pub fn extract_placeholders(content: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Substitutes `{{placeholder}}` occurrences using `lookup`; unknown names are left intact.
pub fn render_placeholders<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER_REGEX
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("Plano Pro").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_future_timestamp() {
        let now = Utc::now();
        assert!(validate_future_timestamp(now + Duration::minutes(1), now).is_ok());
        assert!(validate_future_timestamp(now, now).is_err());
        let err = validate_future_timestamp(now - Duration::days(1), now).unwrap_err();
        assert_eq!(err.code, "past_timestamp");
    }

    #[test]
    fn test_host() {
        assert!(validate_host("db.example.com").is_ok());
        assert!(validate_host("localhost").is_ok());
        assert!(validate_host("10.0.0.12").is_ok());
        assert!(validate_host("::1").is_ok());
        assert!(validate_host("bad host").is_err());
        assert!(validate_host("-leading").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+5511999998888").is_ok());
        assert!(validate_phone("5511999998888").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("+55 11 99999").is_err());
    }

    #[test]
    fn test_extract_placeholders() {
        let vars = extract_placeholders("Olá {{nome}}, seu pedido {{ pedido }} de {{nome}} {{cliente.cidade}}");
        assert_eq!(vars, vec!["cliente.cidade", "nome", "pedido"]);
        assert!(extract_placeholders("no variables").is_empty());
        assert!(extract_placeholders("{{1invalid}}").is_empty());
    }

    #[test]
    fn test_render_placeholders() {
        let out = render_placeholders("Hi {{name}}, code {{code}}", |k| {
            (k == "name").then(|| "Ana".to_string())
        });
        assert_eq!(out, "Hi Ana, code {{code}}");
    }
}
