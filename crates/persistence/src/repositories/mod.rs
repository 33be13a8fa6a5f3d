//! Repository implementations.
//!
//! [`Repositories`] bundles one repository per resource behind the domain
//! ports, backed either by PostgreSQL or by process memory.

pub mod company;
pub mod evolution_config;
pub mod memory;
pub mod message_template;
pub mod plan;
pub mod scheduling;
pub mod smtp_config;
pub mod sql_connection;
pub mod sql_query;
pub mod subscription;
pub mod system_config;
pub mod system_log;
pub mod transaction;
pub mod user;
pub mod webhook_integration;

pub use company::CompanyRepository;
pub use evolution_config::EvolutionConfigRepository;
pub use memory::InMemoryRepository;
pub use message_template::MessageTemplateRepository;
pub use plan::PlanRepository;
pub use scheduling::SchedulingRepository;
pub use smtp_config::SmtpConfigRepository;
pub use sql_connection::SqlConnectionRepository;
pub use sql_query::SqlQueryRepository;
pub use subscription::SubscriptionRepository;
pub use system_config::SystemConfigRepository;
pub use system_log::SystemLogRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;
pub use webhook_integration::WebhookIntegrationRepository;

use std::sync::Arc;

use domain::models::{
    Company, EvolutionConfig, MessageTemplate, Plan, Scheduling, SmtpConfig, SqlConnection,
    SqlQuery, Subscription, SystemConfig, SystemLog, Transaction, User, WebhookIntegration,
};
use domain::repository::{LogRetention, Repository, UserDirectory};
use sqlx::PgPool;

/// Storage backing a [`Repositories`] set.
#[derive(Clone, Debug)]
pub enum Backend {
    Postgres(PgPool),
    Memory,
}

/// One repository per resource.
#[derive(Clone)]
pub struct Repositories {
    pub companies: Arc<dyn Repository<Company>>,
    pub plans: Arc<dyn Repository<Plan>>,
    pub sql_connections: Arc<dyn Repository<SqlConnection>>,
    pub sql_queries: Arc<dyn Repository<SqlQuery>>,
    pub templates: Arc<dyn Repository<MessageTemplate>>,
    pub schedulings: Arc<dyn Repository<Scheduling>>,
    pub users: Arc<dyn Repository<User>>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub webhooks: Arc<dyn Repository<WebhookIntegration>>,
    pub smtp_configs: Arc<dyn Repository<SmtpConfig>>,
    pub evolution_configs: Arc<dyn Repository<EvolutionConfig>>,
    pub system_logs: Arc<dyn Repository<SystemLog>>,
    pub log_retention: Arc<dyn LogRetention>,
    pub system_configs: Arc<dyn Repository<SystemConfig>>,
    pub subscriptions: Arc<dyn Repository<Subscription>>,
    pub transactions: Arc<dyn Repository<Transaction>>,
    backend: Backend,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let system_logs = Arc::new(SystemLogRepository::new(pool.clone()));

        Self {
            companies: Arc::new(CompanyRepository::new(pool.clone())),
            plans: Arc::new(PlanRepository::new(pool.clone())),
            sql_connections: Arc::new(SqlConnectionRepository::new(pool.clone())),
            sql_queries: Arc::new(SqlQueryRepository::new(pool.clone())),
            templates: Arc::new(MessageTemplateRepository::new(pool.clone())),
            schedulings: Arc::new(SchedulingRepository::new(pool.clone())),
            users: users.clone(),
            user_directory: users,
            webhooks: Arc::new(WebhookIntegrationRepository::new(pool.clone())),
            smtp_configs: Arc::new(SmtpConfigRepository::new(pool.clone())),
            evolution_configs: Arc::new(EvolutionConfigRepository::new(pool.clone())),
            system_logs: system_logs.clone(),
            log_retention: system_logs,
            system_configs: Arc::new(SystemConfigRepository::new(pool.clone())),
            subscriptions: Arc::new(SubscriptionRepository::new(pool.clone())),
            transactions: Arc::new(TransactionRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// Process-local repositories; data is lost on restart.
    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryRepository::<User>::new());
        let system_logs = Arc::new(InMemoryRepository::<SystemLog>::new());

        Self {
            companies: Arc::new(InMemoryRepository::<Company>::new()),
            plans: Arc::new(InMemoryRepository::<Plan>::new()),
            sql_connections: Arc::new(InMemoryRepository::<SqlConnection>::new()),
            sql_queries: Arc::new(InMemoryRepository::<SqlQuery>::new()),
            templates: Arc::new(InMemoryRepository::<MessageTemplate>::new()),
            schedulings: Arc::new(InMemoryRepository::<Scheduling>::new()),
            users: users.clone(),
            user_directory: users,
            webhooks: Arc::new(InMemoryRepository::<WebhookIntegration>::new()),
            smtp_configs: Arc::new(InMemoryRepository::<SmtpConfig>::new()),
            evolution_configs: Arc::new(InMemoryRepository::<EvolutionConfig>::new()),
            system_logs: system_logs.clone(),
            log_retention: system_logs,
            system_configs: Arc::new(InMemoryRepository::<SystemConfig>::new()),
            subscriptions: Arc::new(InMemoryRepository::<Subscription>::new()),
            transactions: Arc::new(InMemoryRepository::<Transaction>::new()),
            backend: Backend::Memory,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn pool(&self) -> Option<&PgPool> {
        match &self.backend {
            Backend::Postgres(pool) => Some(pool),
            Backend::Memory => None,
        }
    }

    /// Checks that the backing store answers.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match &self.backend {
            Backend::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Backend::Memory => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_backend_shares_user_store() {
        let repos = Repositories::in_memory();
        assert!(repos.pool().is_none());
        assert!(repos.ping().await.is_ok());
        assert!(repos
            .user_directory
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
