//! Repository ports.
//!
//! Every resource is stored through a [`Repository`]. The `company` argument
//! of the read/write methods is the tenant filter: `None` means unrestricted
//! (master access), `Some(id)` restricts the operation to rows of that company.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::services::ServiceError;

/// Errors reported by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record conflicts with an existing one: {0}")]
    Conflict(String),

    #[error("Referenced record does not exist: {0}")]
    ForeignKey(String),

    #[error("Data store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored row is invalid: {0}")]
    Corrupt(String),
}

/// How a resource relates to tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoping {
    /// Shared by every tenant (plans, system configs).
    Global,
    /// Belongs to exactly one company.
    Tenant,
    /// Belongs to at most one company (users, system logs).
    OptionalTenant,
    /// The tenant record itself.
    Company,
}

/// Plan-limited resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Users,
    SqlConnections,
    SqlQueries,
    Templates,
    Schedulings,
}

impl LimitKind {
    pub fn label(&self) -> &'static str {
        match self {
            LimitKind::Users => "users",
            LimitKind::SqlConnections => "SQL connections",
            LimitKind::SqlQueries => "SQL queries",
            LimitKind::Templates => "templates",
            LimitKind::Schedulings => "schedulings",
        }
    }
}

/// A record type managed through [`crate::services::ResourceService`].
pub trait Resource: Clone + std::fmt::Debug + Send + Sync + 'static {
    type Create: Validate + Clone + std::fmt::Debug + Send + Sync + 'static;
    type Update: Validate + Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Human readable singular name used in notifications.
    const LABEL: &'static str;
    const SCOPING: Scoping;
    const LIMIT: Option<LimitKind> = None;
    /// Whether successful writes produce a notification.
    const NOTIFY_SUCCESS: bool = true;

    fn id(&self) -> Uuid;

    fn company_id(&self) -> Option<Uuid>;

    /// Natural key that must be unique across the table, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Company requested by the payload itself, used when the caller has no
    /// company selected (master creating a user for a given company).
    fn requested_company(_input: &Self::Create) -> Option<Uuid> {
        None
    }

    /// Resource specific checks and derived fields, run after `validate()`.
    fn prepare_create(
        _input: &mut Self::Create,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    fn prepare_update(_input: &mut Self::Update, _now: DateTime<Utc>) -> Result<(), ServiceError> {
        Ok(())
    }

    fn is_noop_update(input: &Self::Update) -> bool;

    /// Builds the record a store would return for `input`.
    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &Self::Create,
        now: DateTime<Utc>,
    ) -> Self;

    /// Applies a partial update in place (COALESCE semantics).
    fn apply_update(&mut self, input: &Self::Update, now: DateTime<Utc>);

    /// Whether the record is visible under the given tenant filter.
    fn visible_to(&self, company: Option<Uuid>) -> bool {
        let Some(company) = company else {
            return true;
        };
        match Self::SCOPING {
            Scoping::Global => true,
            Scoping::Company => self.id() == company,
            Scoping::Tenant | Scoping::OptionalTenant => self.company_id() == Some(company),
        }
    }
}

/// CRUD access to one resource table.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<R>, RepositoryError>;

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<R>, RepositoryError>;

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError>;

    async fn create(
        &self,
        company_id: Option<Uuid>,
        input: &R::Create,
    ) -> Result<R, RepositoryError>;

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &R::Update,
    ) -> Result<Option<R>, RepositoryError>;

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Credential lookup for the login flow.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<crate::models::User>, RepositoryError>;
}

/// Bulk removal of system logs.
#[async_trait]
pub trait LogRetention: Send + Sync {
    /// Deletes every log visible under `company`; returns the number removed.
    async fn clear(&self, company: Option<Uuid>) -> Result<u64, RepositoryError>;
}
