//! Execution of saved read-only queries against customer databases.
//!
//! Only PostgreSQL targets can be executed. Every run happens inside a
//! `READ ONLY` transaction with a `statement_timeout`, and rows come back as
//! JSON objects built by the server with `row_to_json`.

use std::time::{Duration, Instant};

use domain::models::{is_read_only, DatabaseType, SqlConnection};
use serde::Serialize;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{Connection, Row};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::record_outbound_call;
use crate::services::probe::probe_tcp;

/// SQLSTATE raised when `statement_timeout` cancels a statement.
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Execution is only supported for PostgreSQL connections, not {0}")]
    Unsupported(DatabaseType),

    #[error("Only single SELECT statements can be executed")]
    ReadOnly,

    #[error("Could not connect to the database: {0}")]
    Connect(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Query exceeded the {0}s time limit")]
    Timeout(u64),
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Connect(_) | ExecutorError::Timeout(_) => {
                ApiError::BadGateway(err.to_string())
            }
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Value>,
    pub row_count: usize,
    /// More rows were available than `max_rows`.
    pub truncated: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SqlExecutor {
    max_rows: usize,
    statement_timeout: Duration,
    connect_timeout: Duration,
}

impl SqlExecutor {
    pub fn new(max_rows: usize, statement_timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            max_rows,
            statement_timeout,
            connect_timeout,
        }
    }

    fn options(connection: &SqlConnection) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&connection.host)
            .port(u16::try_from(connection.port).unwrap_or(5432))
            .database(&connection.database_name)
            .username(&connection.username)
            .password(&connection.password)
            .ssl_mode(if connection.ssl_enabled {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            })
            .application_name("tenant-admin")
    }

    async fn connect(&self, connection: &SqlConnection) -> Result<PgConnection, ExecutorError> {
        tokio::time::timeout(
            self.connect_timeout,
            PgConnection::connect_with(&Self::options(connection)),
        )
        .await
        .map_err(|_| ExecutorError::Connect("connection timed out".into()))?
        .map_err(|e| ExecutorError::Connect(e.to_string()))
    }

    /// Checks that the stored credentials work. Non-PostgreSQL targets only
    /// get a TCP reachability check.
    pub async fn test_connection(&self, connection: &SqlConnection) -> Result<(), ExecutorError> {
        let result = match connection.db_type {
            DatabaseType::Postgres => {
                let mut conn = self.connect(connection).await?;
                let ping = sqlx::query("SELECT 1")
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(|e| ExecutorError::Query(e.to_string()));
                let _ = conn.close().await;
                ping
            }
            _ => {
                let address = format!("{}:{}", connection.host, connection.port);
                probe_tcp(&address, self.connect_timeout)
                    .await
                    .map_err(|e| ExecutorError::Connect(e.to_string()))
            }
        };

        record_outbound_call("sql", result.is_ok());
        result
    }

    /// Runs `sql` against `connection` and returns at most `max_rows` rows.
    pub async fn execute(
        &self,
        connection: &SqlConnection,
        sql: &str,
    ) -> Result<QueryResult, ExecutorError> {
        if connection.db_type != DatabaseType::Postgres {
            return Err(ExecutorError::Unsupported(connection.db_type));
        }
        if !is_read_only(sql) {
            return Err(ExecutorError::ReadOnly);
        }

        let statement = sql.trim().trim_end_matches(';');
        let start = Instant::now();
        let result = self.run(connection, statement).await;
        record_outbound_call("sql", result.is_ok());

        match result {
            Ok(mut rows) => {
                let truncated = rows.len() > self.max_rows;
                rows.truncate(self.max_rows);
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    connection_id = %connection.id,
                    rows = rows.len(),
                    truncated,
                    duration_ms,
                    "Saved query executed"
                );
                Ok(QueryResult {
                    row_count: rows.len(),
                    rows,
                    truncated,
                    duration_ms,
                })
            }
            Err(e) => {
                warn!(connection_id = %connection.id, error = %e, "Saved query failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        connection: &SqlConnection,
        statement: &str,
    ) -> Result<Vec<Value>, ExecutorError> {
        let mut conn = self.connect(connection).await?;
        let timeout_secs = self.statement_timeout.as_secs();

        let outcome = async {
            let mut tx = conn.begin().await.map_err(query_error(timeout_secs))?;
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(query_error(timeout_secs))?;
            sqlx::query(&format!(
                "SET LOCAL statement_timeout = {}",
                self.statement_timeout.as_millis()
            ))
            .execute(&mut *tx)
            .await
            .map_err(query_error(timeout_secs))?;

            let wrapped = format!(
                "SELECT row_to_json(t) FROM ({}) t LIMIT {}",
                statement,
                self.max_rows + 1
            );
            let rows = sqlx::query(&wrapped)
                .fetch_all(&mut *tx)
                .await
                .map_err(query_error(timeout_secs))?;

            let values = rows
                .iter()
                .map(|row| row.try_get::<Value, _>(0))
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_error(timeout_secs))?;

            tx.rollback().await.map_err(query_error(timeout_secs))?;
            Ok::<_, ExecutorError>(values)
        }
        .await;

        let _ = conn.close().await;
        outcome
    }
}

fn query_error(timeout_secs: u64) -> impl Fn(sqlx::Error) -> ExecutorError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            ExecutorError::Timeout(timeout_secs)
        }
        _ => ExecutorError::Query(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::ConnectionStatus;
    use uuid::Uuid;

    fn connection(db_type: DatabaseType) -> SqlConnection {
        SqlConnection {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "ERP".into(),
            db_type,
            host: "127.0.0.1".into(),
            port: 9,
            database_name: "erp".into(),
            username: "reader".into(),
            password: "secret".into(),
            ssl_enabled: false,
            status: ConnectionStatus::Inactive,
            last_tested_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn executor() -> SqlExecutor {
        SqlExecutor::new(10, Duration::from_secs(1), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_non_postgres_is_unsupported() {
        let err = executor()
            .execute(&connection(DatabaseType::Mysql), "SELECT 1")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Unsupported(DatabaseType::Mysql)));
        assert!(matches!(ApiError::from(err), ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_write_statement_is_rejected_before_connecting() {
        let err = executor()
            .execute(&connection(DatabaseType::Postgres), "DELETE FROM clientes")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ReadOnly));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_bad_gateway() {
        let err = executor()
            .execute(&connection(DatabaseType::Postgres), "SELECT 1")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Connect(_)));
        assert!(matches!(ApiError::from(err), ApiError::BadGateway(_)));
    }
}
