//! HTTP route handlers.

pub mod auth;
pub mod companies;
pub mod crud;
pub mod evolution;
pub mod health;
pub mod plans;
pub mod schedulings;
pub mod smtp_configs;
pub mod sql_connections;
pub mod sql_queries;
pub mod subscriptions;
pub mod system_configs;
pub mod system_logs;
pub mod templates;
pub mod transactions;
pub mod users;
pub mod webhooks;

use axum::Router;

use crate::app::AppState;

/// Versioned API, mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/companies", companies::router())
        .nest("/plans", plans::router())
        .nest("/sql-connections", sql_connections::router())
        .nest("/sql-queries", sql_queries::router())
        .nest("/templates", templates::router())
        .nest("/schedulings", schedulings::router())
        .nest("/users", users::router())
        .nest("/webhooks", webhooks::router())
        .nest("/smtp-configs", smtp_configs::router())
        .nest("/evolution", evolution::router())
        .nest("/system-logs", system_logs::router())
        .nest("/system-configs", system_configs::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/transactions", transactions::router())
}
