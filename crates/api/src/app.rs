use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use domain::repository::Resource;
use domain::services::{Notifier, PlanLimitGuard, ResourceService};
use persistence::repositories::Repositories;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id, LoginRateLimiter,
};
use crate::routes::{self, health};
use crate::services::{
    EvolutionClient, EvolutionFallbackStore, SqlExecutor, SystemLogNotifier, WebhookTester,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repos: Repositories,
    pub notifier: Arc<dyn Notifier>,
    pub jwt: Arc<JwtConfig>,
    pub http: reqwest::Client,
    pub login_limiter: Option<Arc<LoginRateLimiter>>,
    pub evolution_fallback: Arc<EvolutionFallbackStore>,
}

impl AppState {
    /// Builds the state with notifications stored as system logs.
    pub fn new(config: Config, repos: Repositories) -> Result<Self, StartupError> {
        let notifier: Arc<dyn Notifier> = Arc::new(SystemLogNotifier::new(repos.system_logs.clone()));
        Self::with_notifier(config, repos, notifier)
    }

    pub fn with_notifier(
        config: Config,
        repos: Repositories,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StartupError> {
        let jwt = JwtConfig::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("tenant-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let login_limiter = LoginRateLimiter::new(config.security.login_attempts_per_minute).map(Arc::new);
        let evolution_fallback = Arc::new(EvolutionFallbackStore::new(
            config.evolution.fallback_dir.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            repos,
            notifier,
            jwt: Arc::new(jwt),
            http,
            login_limiter,
            evolution_fallback,
        })
    }

    pub fn plan_limits(&self) -> PlanLimitGuard {
        PlanLimitGuard::new(self.repos.companies.clone(), self.repos.plans.clone())
    }

    /// Service for `R` over the given repository; plan limits apply when `R` declares one.
    pub fn service<R: Resource>(
        &self,
        repo: Arc<dyn domain::repository::Repository<R>>,
    ) -> ResourceService<R> {
        let service = ResourceService::new(repo, self.notifier.clone());
        if R::LIMIT.is_some() {
            service.with_limits(self.plan_limits())
        } else {
            service
        }
    }

    pub fn webhook_tester(&self) -> WebhookTester {
        WebhookTester::new(
            self.http.clone(),
            Duration::from_secs(self.config.outbound.webhook_timeout_secs),
        )
    }

    pub fn evolution_client(&self) -> EvolutionClient {
        EvolutionClient::new(
            self.http.clone(),
            Duration::from_secs(self.config.outbound.evolution_timeout_secs),
        )
    }

    pub fn sql_executor(&self) -> SqlExecutor {
        SqlExecutor::new(
            self.config.limits.max_query_rows,
            Duration::from_secs(self.config.limits.query_timeout_secs),
            Duration::from_secs(self.config.database.connect_timeout_secs),
        )
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.config.outbound.smtp_timeout_secs)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", routes::api_routes())
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .with_state(state)
}
