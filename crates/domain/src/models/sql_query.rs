//! Saved SQL query domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::repository::{LimitKind, Resource, Scoping};
use shared::validation::validate_not_blank;

const WRITE_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "merge", "drop", "alter", "create", "truncate", "grant",
    "revoke", "copy", "call", "execute", "vacuum", "lock",
];

/// Whether `sql` is a single read statement (`SELECT` or `WITH ... SELECT`).
pub fn is_read_only(sql: &str) -> bool {
    let statement = sql.trim().trim_end_matches(';').trim_end();
    if statement.is_empty() || statement.contains(';') {
        return false;
    }

    let mut words = statement
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase());

    match words.next().as_deref() {
        Some("select") | Some("with") => {}
        _ => return false,
    }

    !words.any(|w| WRITE_KEYWORDS.contains(&w.as_str()))
}

/// A query saved against one of the company's SQL connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlQuery {
    pub id: Uuid,
    pub company_id: Uuid,
    pub connection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub query_text: String,
    pub is_active: bool,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSqlQueryRequest {
    pub connection_id: Uuid,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 20000, message = "Query must be at most 20000 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub query_text: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSqlQueryRequest {
    pub connection_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 20000, message = "Query must be at most 20000 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub query_text: Option<String>,
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl UpdateSqlQueryRequest {
    pub fn executed(at: DateTime<Utc>) -> Self {
        Self {
            last_executed_at: Some(at),
            ..Default::default()
        }
    }
}

impl Resource for SqlQuery {
    type Create = CreateSqlQueryRequest;
    type Update = UpdateSqlQueryRequest;

    const LABEL: &'static str = "SQL query";
    const SCOPING: Scoping = Scoping::Tenant;
    const LIMIT: Option<LimitKind> = Some(LimitKind::SqlQueries);

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn is_noop_update(input: &UpdateSqlQueryRequest) -> bool {
        input.connection_id.is_none()
            && input.name.is_none()
            && input.description.is_none()
            && input.query_text.is_none()
            && input.is_active.is_none()
            && input.last_executed_at.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSqlQueryRequest,
        now: DateTime<Utc>,
    ) -> Self {
        SqlQuery {
            id,
            company_id: company_id.unwrap_or_default(),
            connection_id: input.connection_id,
            name: input.name.clone(),
            description: input.description.clone(),
            query_text: input.query_text.clone(),
            is_active: input.is_active,
            last_executed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSqlQueryRequest, now: DateTime<Utc>) {
        if let Some(connection_id) = input.connection_id {
            self.connection_id = connection_id;
        }
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(description) = &input.description {
            self.description = Some(description.clone());
        }
        if let Some(query_text) = &input.query_text {
            self.query_text = query_text.clone();
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        if let Some(executed_at) = input.last_executed_at {
            self.last_executed_at = Some(executed_at);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_statements() {
        assert!(is_read_only("SELECT * FROM clientes"));
        assert!(is_read_only("  select nome, telefone from clientes where ativo;  "));
        assert!(is_read_only(
            "WITH recent AS (SELECT * FROM pedidos) SELECT count(*) FROM recent"
        ));
    }

    #[test]
    fn test_write_statements_rejected() {
        assert!(!is_read_only("DELETE FROM clientes"));
        assert!(!is_read_only("UPDATE clientes SET ativo = false"));
        assert!(!is_read_only("SELECT 1; DROP TABLE clientes"));
        assert!(!is_read_only("WITH gone AS (DELETE FROM pedidos RETURNING *) SELECT * FROM gone"));
        assert!(!is_read_only(""));
        assert!(!is_read_only(";"));
    }

    #[test]
    fn test_blank_query_rejected() {
        let req = CreateSqlQueryRequest {
            connection_id: Uuid::new_v4(),
            name: "Clientes".into(),
            description: None,
            query_text: "   ".into(),
            is_active: true,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_executed_update_is_not_noop() {
        let update = UpdateSqlQueryRequest::executed(Utc::now());
        assert!(!SqlQuery::is_noop_update(&update));
        assert!(SqlQuery::is_noop_update(&UpdateSqlQueryRequest::default()));
    }
}
