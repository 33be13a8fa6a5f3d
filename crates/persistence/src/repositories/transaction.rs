//! Repository for billing transaction database operations.

use async_trait::async_trait;
use domain::models::{CreateTransactionRequest, Transaction, UpdateTransactionRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TransactionEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Transaction> for TransactionRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = timed(
            "list_transactions",
            sqlx::query_as::<_, TransactionEntity>(
                r#"
                SELECT id, company_id, subscription_id, amount_cents, currency, status,
                       payment_method, description, paid_at, created_at, updated_at
                FROM transactions
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn find(
        &self,
        company: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = timed(
            "find_transaction",
            sqlx::query_as::<_, TransactionEntity>(
                r#"
                SELECT id, company_id, subscription_id, amount_cents, currency, status,
                       payment_method, description, paid_at, created_at, updated_at
                FROM transactions
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Transaction::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_transactions",
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE company_id = $1")
                .bind(company_id)
                .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(count.0)
    }

    async fn create(
        &self,
        company_id: Option<Uuid>,
        input: &CreateTransactionRequest,
    ) -> Result<Transaction, RepositoryError> {
        let row = timed(
            "create_transaction",
            sqlx::query_as::<_, TransactionEntity>(
                r#"
                INSERT INTO transactions (id, company_id, subscription_id, amount_cents, currency,
                                          status, payment_method, description, paid_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id, company_id, subscription_id, amount_cents, currency, status,
                          payment_method, description, paid_at, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.subscription_id)
            .bind(input.amount_cents)
            .bind(&input.currency)
            .bind(input.status.as_str())
            .bind(&input.payment_method)
            .bind(&input.description)
            .bind(input.paid_at)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Transaction::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateTransactionRequest,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = timed(
            "update_transaction",
            sqlx::query_as::<_, TransactionEntity>(
                r#"
                UPDATE transactions SET
                    status = COALESCE($3, status),
                    payment_method = COALESCE($4, payment_method),
                    description = COALESCE($5, description),
                    paid_at = COALESCE($6, paid_at),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, subscription_id, amount_cents, currency, status,
                          payment_method, description, paid_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.payment_method)
            .bind(&input.description)
            .bind(input.paid_at)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Transaction::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_transaction",
            sqlx::query(
                "DELETE FROM transactions WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
            )
            .bind(id)
            .bind(company)
            .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
