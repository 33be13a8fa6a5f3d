//! Repository for company database operations.

use async_trait::async_trait;
use domain::models::{Company, CreateCompanyRequest, UpdateCompanyRequest};
use domain::repository::{Repository, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CompanyEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

/// Repository for companies. The tenant filter restricts access to the
/// selected company itself.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Company> for CompanyRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<Company>, RepositoryError> {
        let rows = timed(
            "list_companies",
            sqlx::query_as::<_, CompanyEntity>(
                r#"
                SELECT id, name, document, email, phone, plan_id, status, created_at, updated_at
                FROM companies
                WHERE ($1::uuid IS NULL OR id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Company::try_from).collect()
    }

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<Company>, RepositoryError> {
        let row = timed(
            "find_company",
            sqlx::query_as::<_, CompanyEntity>(
                r#"
                SELECT id, name, document, email, phone, plan_id, status, created_at, updated_at
                FROM companies
                WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Company::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_companies",
            sqlx::query_as("SELECT COUNT(*) FROM companies WHERE id = $1")
                .bind(company_id)
                .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(count.0)
    }

    async fn create(
        &self,
        _company_id: Option<Uuid>,
        input: &CreateCompanyRequest,
    ) -> Result<Company, RepositoryError> {
        let row = timed(
            "create_company",
            sqlx::query_as::<_, CompanyEntity>(
                r#"
                INSERT INTO companies (id, name, document, email, phone, plan_id, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, name, document, email, phone, plan_id, status, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.document)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.plan_id)
            .bind(input.status.as_str())
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Company::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateCompanyRequest,
    ) -> Result<Option<Company>, RepositoryError> {
        let row = timed(
            "update_company",
            sqlx::query_as::<_, CompanyEntity>(
                r#"
                UPDATE companies SET
                    name = COALESCE($3, name),
                    document = COALESCE($4, document),
                    email = COALESCE($5, email),
                    phone = COALESCE($6, phone),
                    plan_id = COALESCE($7, plan_id),
                    status = COALESCE($8, status),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)
                RETURNING id, name, document, email, phone, plan_id, status, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.name)
            .bind(&input.document)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.plan_id)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(Company::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_company",
            sqlx::query("DELETE FROM companies WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)")
                .bind(id)
                .bind(company)
                .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
