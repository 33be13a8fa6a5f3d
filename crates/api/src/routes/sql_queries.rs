//! Saved SQL query route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use domain::models::{CreateSqlQueryRequest, SqlQuery, UpdateSqlQueryRequest};
use domain::repository::Repository;
use tracing::warn;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;
use crate::services::QueryResult;

#[axum::async_trait]
impl CrudResource for SqlQuery {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.sql_queries.clone()
    }

    async fn before_create(
        state: &AppState,
        tenant: &Tenant,
        input: &mut CreateSqlQueryRequest,
    ) -> Result<(), ApiError> {
        if tenant.company_id().is_some() {
            crud::ensure_visible(&state.repos.sql_connections, tenant, input.connection_id).await?;
        }
        Ok(())
    }

    async fn before_update(
        state: &AppState,
        tenant: &Tenant,
        _id: Uuid,
        input: &mut UpdateSqlQueryRequest,
    ) -> Result<(), ApiError> {
        if let Some(connection_id) = input.connection_id {
            crud::ensure_visible(&state.repos.sql_connections, tenant, connection_id).await?;
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<SqlQuery>().route("/:id/execute", post(execute_query))
}

/// Run a saved query on its connection.
///
/// POST /api/v1/sql-queries/:id/execute
///
/// Only read statements on PostgreSQL connections are executed; the number
/// of returned rows is capped by `limits.max_query_rows`.
async fn execute_query(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<QueryResult>, ApiError> {
    let query = crud::ensure_visible(&state.repos.sql_queries, &tenant, id).await?;
    if !query.is_active {
        return Err(ApiError::Validation("Query is inactive".into()));
    }
    let connection =
        crud::ensure_visible(&state.repos.sql_connections, &tenant, query.connection_id).await?;

    match state.sql_executor().execute(&connection, &query.query_text).await {
        Ok(result) => {
            state
                .repos
                .sql_queries
                .update(
                    Some(query.company_id),
                    id,
                    &UpdateSqlQueryRequest::executed(Utc::now()),
                )
                .await?;
            Ok(Json(result))
        }
        Err(e) => {
            warn!(query_id = %id, error = %e, "Query execution failed");
            crud::notify_outcome(
                &state,
                &tenant,
                "SQL query",
                Err(e.to_string()),
                "Error executing SQL query",
            )
            .await;
            Err(e.into())
        }
    }
}
