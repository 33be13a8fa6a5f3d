//! Repository for user database operations.

use async_trait::async_trait;
use domain::models::{CreateUserRequest, UpdateUserRequest, User};
use domain::repository::{Repository, RepositoryError, UserDirectory};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::error::map_db_error;
use crate::metrics::timed;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<User>, RepositoryError> {
        let rows = timed(
            "list_users",
            sqlx::query_as::<_, UserEntity>(
                r#"
                SELECT id, company_id, email, name, role, is_active, password_hash,
                       last_login_at, created_at, updated_at
                FROM users
                WHERE ($1::uuid IS NULL OR company_id = $1)
                ORDER BY created_at DESC
                "#,
            )
            .bind(company)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row = timed(
            "find_user",
            sqlx::query_as::<_, UserEntity>(
                r#"
                SELECT id, company_id, email, name, role, is_active, password_hash,
                       last_login_at, created_at, updated_at
                FROM users
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                "#,
            )
            .bind(id)
            .bind(company)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let count: (i64,) = timed(
            "count_users",
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE company_id = $1")
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
        input: &CreateUserRequest,
    ) -> Result<User, RepositoryError> {
        let row = timed(
            "create_user",
            sqlx::query_as::<_, UserEntity>(
                r#"
                INSERT INTO users (id, company_id, email, name, role, is_active, password_hash)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, company_id, email, name, role, is_active, password_hash,
                          last_login_at, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id.or(input.company_id))
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.role.as_str())
            .bind(input.is_active)
            .bind(&input.password_hash)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        User::try_from(row)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &UpdateUserRequest,
    ) -> Result<Option<User>, RepositoryError> {
        let row = timed(
            "update_user",
            sqlx::query_as::<_, UserEntity>(
                r#"
                UPDATE users SET
                    name = COALESCE($3, name),
                    role = COALESCE($4, role),
                    is_active = COALESCE($5, is_active),
                    password_hash = COALESCE($6, password_hash),
                    last_login_at = COALESCE($7, last_login_at),
                    updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
                RETURNING id, company_id, email, name, role, is_active, password_hash,
                          last_login_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(company)
            .bind(&input.name)
            .bind(input.role.map(|r| r.as_str()))
            .bind(input.is_active)
            .bind(&input.password_hash)
            .bind(input.last_login_at)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let result = timed(
            "delete_user",
            sqlx::query("DELETE FROM users WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)")
                .bind(id)
                .bind(company)
                .execute(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = timed(
            "find_user_by_email",
            sqlx::query_as::<_, UserEntity>(
                r#"
                SELECT id, company_id, email, name, role, is_active, password_hash,
                       last_login_at, created_at, updated_at
                FROM users
                WHERE LOWER(email) = LOWER($1)
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }
}
