//! External database connection domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repository::{LimitKind, Resource, Scoping};
use crate::services::ServiceError;
use shared::validation::{validate_host, validate_not_blank};

text_enum!(
    DatabaseType, "database type" {
        Postgres => "postgres",
        Mysql => "mysql",
        SqlServer => "sqlserver",
    }
);

impl DatabaseType {
    pub fn default_port(&self) -> i32 {
        match self {
            DatabaseType::Postgres => 5432,
            DatabaseType::Mysql => 3306,
            DatabaseType::SqlServer => 1433,
        }
    }
}

text_enum!(
    ConnectionStatus, "connection status" {
        Active => "active",
        Inactive => "inactive",
        Error => "error",
    }
);

/// Connection to a customer database used by SQL queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlConnection {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub db_type: DatabaseType,
    pub host: String,
    pub port: i32,
    pub database_name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub ssl_enabled: bool,
    pub status: ConnectionStatus,
    pub last_tested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSqlConnectionRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub db_type: DatabaseType,
    #[validate(custom(function = "validate_host"))]
    pub host: String,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "Database name must be 1-255 characters"))]
    pub database_name: String,
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub ssl_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSqlConnectionRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_host"))]
    pub host: Option<String>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "Database name must be 1-255 characters"))]
    pub database_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 1024, message = "Password cannot be empty"))]
    pub password: Option<String>,
    pub ssl_enabled: Option<bool>,
    pub status: Option<ConnectionStatus>,
    #[serde(skip)]
    pub last_tested_at: Option<DateTime<Utc>>,
}

impl UpdateSqlConnectionRequest {
    /// Records the outcome of a connectivity test.
    pub fn tested(ok: bool, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(if ok {
                ConnectionStatus::Active
            } else {
                ConnectionStatus::Error
            }),
            last_tested_at: Some(at),
            ..Default::default()
        }
    }
}

impl Resource for SqlConnection {
    type Create = CreateSqlConnectionRequest;
    type Update = UpdateSqlConnectionRequest;

    const LABEL: &'static str = "SQL connection";
    const SCOPING: Scoping = Scoping::Tenant;
    const LIMIT: Option<LimitKind> = Some(LimitKind::SqlConnections);

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateSqlConnectionRequest,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        input.host = input.host.trim().to_string();
        if input.port.is_none() {
            input.port = Some(input.db_type.default_port());
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateSqlConnectionRequest) -> bool {
        input.name.is_none()
            && input.host.is_none()
            && input.port.is_none()
            && input.database_name.is_none()
            && input.username.is_none()
            && input.password.is_none()
            && input.ssl_enabled.is_none()
            && input.status.is_none()
            && input.last_tested_at.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateSqlConnectionRequest,
        now: DateTime<Utc>,
    ) -> Self {
        SqlConnection {
            id,
            company_id: company_id.unwrap_or_default(),
            name: input.name.clone(),
            db_type: input.db_type,
            host: input.host.clone(),
            port: input.port.unwrap_or_else(|| input.db_type.default_port()),
            database_name: input.database_name.clone(),
            username: input.username.clone(),
            password: input.password.clone(),
            ssl_enabled: input.ssl_enabled,
            status: ConnectionStatus::Inactive,
            last_tested_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateSqlConnectionRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(host) = &input.host {
            self.host = host.clone();
        }
        if let Some(port) = input.port {
            self.port = port;
        }
        if let Some(database_name) = &input.database_name {
            self.database_name = database_name.clone();
        }
        if let Some(username) = &input.username {
            self.username = username.clone();
        }
        if let Some(password) = &input.password {
            self.password = password.clone();
        }
        if let Some(ssl_enabled) = input.ssl_enabled {
            self.ssl_enabled = ssl_enabled;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(tested_at) = input.last_tested_at {
            self.last_tested_at = Some(tested_at);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateSqlConnectionRequest {
        CreateSqlConnectionRequest {
            name: "ERP".into(),
            db_type: DatabaseType::Mysql,
            host: "db.internal".into(),
            port: None,
            database_name: "erp".into(),
            username: "reader".into(),
            password: "s3cret-pass".into(),
            ssl_enabled: false,
        }
    }

    #[test]
    fn test_default_port_filled_from_db_type() {
        let mut req = request();
        SqlConnection::prepare_create(&mut req, None, Utc::now()).unwrap();
        assert_eq!(req.port, Some(3306));
        assert_eq!(DatabaseType::Postgres.default_port(), 5432);
        assert_eq!(DatabaseType::SqlServer.default_port(), 1433);
    }

    #[test]
    fn test_port_range_validated() {
        let mut req = request();
        req.port = Some(70000);
        assert!(req.validate().is_err());
        req.port = Some(0);
        assert!(req.validate().is_err());
        req.port = Some(5433);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut req = request();
        req.host = "bad host!".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_password_never_serialized() {
        let conn = SqlConnection::materialize(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            &request(),
            Utc::now(),
        );
        let json = serde_json::to_string(&conn).unwrap();
        assert!(!json.contains("s3cret-pass"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_tested_update_sets_status() {
        let now = Utc::now();
        let update = UpdateSqlConnectionRequest::tested(false, now);
        assert_eq!(update.status, Some(ConnectionStatus::Error));
        assert_eq!(update.last_tested_at, Some(now));
        assert!(!SqlConnection::is_noop_update(&update));
    }

    #[test]
    fn test_db_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&DatabaseType::SqlServer).unwrap(),
            "\"sqlserver\""
        );
    }
}
