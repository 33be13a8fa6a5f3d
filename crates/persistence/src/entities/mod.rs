//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. Enumerations are stored as
//! `TEXT`; converting an entity into its domain model parses them back.

pub mod company;
pub mod evolution_config;
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

pub use company::CompanyEntity;
pub use evolution_config::EvolutionConfigEntity;
pub use message_template::MessageTemplateEntity;
pub use plan::PlanEntity;
pub use scheduling::SchedulingEntity;
pub use smtp_config::SmtpConfigEntity;
pub use sql_connection::SqlConnectionEntity;
pub use sql_query::SqlQueryEntity;
pub use subscription::SubscriptionEntity;
pub use system_config::SystemConfigEntity;
pub use system_log::SystemLogEntity;
pub use transaction::TransactionEntity;
pub use user::UserEntity;
pub use webhook_integration::WebhookIntegrationEntity;

use domain::repository::RepositoryError;
use std::str::FromStr;

/// Parses a `TEXT` enumeration column.
pub(crate) fn parse_column<T>(table: &str, column: &str, value: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| RepositoryError::Corrupt(format!("{}.{}: {}", table, column, e)))
}
