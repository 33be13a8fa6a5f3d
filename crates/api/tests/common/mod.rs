//! Common test utilities for integration tests.
//!
//! Every test builds its own application over the in-memory backend, so no
//! database is required.

// Not every integration test uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderName, Method, Request},
    response::Response,
    Router,
};
use domain::models::{
    Company, CompanyStatus, CreateCompanyRequest, CreatePlanRequest, CreateUserRequest, Plan,
    User, UserRole,
};
use domain::services::TenantContext;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::repositories::Repositories;
use serde_json::Value;
use tempfile::TempDir;
use tenant_admin_api::app::{create_app, AppState};
use tenant_admin_api::config::{
    BootstrapConfig, Config, DatabaseConfig, EvolutionConfig, JwtAuthConfig, LimitsConfig,
    LoggingConfig, OutboundConfig, SecurityConfig, ServerConfig, StorageBackend,
};
use tenant_admin_api::extractors::COMPANY_HEADER;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "SecureP@ss123!";

/// Test configuration over the in-memory backend.
///
/// `login_attempts_per_minute = 0` disables the login limiter.
pub fn test_config(fallback_dir: &std::path::Path, login_attempts_per_minute: u32) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_size: 1_048_576,
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 2,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            login_attempts_per_minute,
            hsts_enabled: false,
        },
        jwt: JwtAuthConfig {
            secret: "integration_test_secret_key_0123456789".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 0,
        },
        limits: LimitsConfig {
            max_query_rows: 100,
            query_timeout_secs: 5,
        },
        outbound: OutboundConfig {
            webhook_timeout_secs: 5,
            smtp_timeout_secs: 2,
            evolution_timeout_secs: 5,
        },
        evolution: EvolutionConfig {
            fallback_dir: fallback_dir.to_path_buf(),
        },
        bootstrap: BootstrapConfig::default(),
    }
}

/// Application under test plus handles to its state.
pub struct TestApp {
    pub state: AppState,
    _fallback_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_login_limit(0)
    }

    pub fn with_login_limit(login_attempts_per_minute: u32) -> Self {
        let fallback_dir = TempDir::new().unwrap();
        let config = test_config(fallback_dir.path(), login_attempts_per_minute);
        let state = AppState::new(config, Repositories::in_memory()).unwrap();
        Self {
            state,
            _fallback_dir: fallback_dir,
        }
    }

    pub fn router(&self) -> Router {
        create_app(self.state.clone())
    }

    /// Sends one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn seed_plan(&self, max_per_resource: i32) -> Plan {
        let input: CreatePlanRequest = serde_json::from_value(serde_json::json!({
            "name": format!("Plan {}", Uuid::new_v4().simple()),
            "price_cents": 4900,
            "max_users": max_per_resource,
            "max_sql_connections": max_per_resource,
            "max_sql_queries": max_per_resource,
            "max_templates": max_per_resource,
            "max_schedulings": max_per_resource
        }))
        .unwrap();
        self.state
            .service(self.state.repos.plans.clone())
            .create(&TenantContext::system(), input)
            .await
            .unwrap()
    }

    pub async fn seed_company(&self, plan_id: Option<Uuid>) -> Company {
        self.seed_company_with_status(plan_id, CompanyStatus::Active)
            .await
    }

    pub async fn seed_company_with_status(
        &self,
        plan_id: Option<Uuid>,
        status: CompanyStatus,
    ) -> Company {
        let input = CreateCompanyRequest {
            name: format!("Company {}", Uuid::new_v4().simple()),
            document: None,
            email: None,
            phone: None,
            plan_id,
            status,
        };
        self.state
            .service(self.state.repos.companies.clone())
            .create(&TenantContext::system(), input)
            .await
            .unwrap()
    }

    pub async fn seed_user(&self, role: UserRole, company_id: Option<Uuid>) -> User {
        let input = CreateUserRequest {
            company_id,
            email: unique_test_email(),
            name: Name().fake(),
            password: TEST_PASSWORD.to_string(),
            role,
            is_active: true,
            password_hash: String::new(),
        };
        self.state
            .service(self.state.repos.users.clone())
            .create(&TenantContext::system(), input)
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .jwt
            .issue(user.id, user.role.as_str(), user.company_id)
            .unwrap()
            .0
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a unique email for testing.
pub fn unique_test_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4().simple())
}

/// Request builder with JSON body and optional bearer token.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Same as [`json_request`] with the company selection header set.
pub fn company_request(
    method: Method,
    uri: &str,
    token: &str,
    company_id: Uuid,
    body: Option<Value>,
) -> Request<Body> {
    let mut request = json_request(method, uri, Some(token), body);
    request.headers_mut().insert(
        COMPANY_HEADER.parse::<HeaderName>().unwrap(),
        company_id.to_string().parse().unwrap(),
    );
    request
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
