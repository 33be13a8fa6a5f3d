//! Domain models for the tenant admin backend.
//!
//! Each module holds the record type, its create/update payloads and the
//! [`Resource`](crate::repository::Resource) implementation tying them together.

/// Declares a closed set of lowercase text values stored as `TEXT` columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {}: {}", $label, s)),
                }
            }
        }
    };
}

pub mod company;
pub mod evolution;
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
pub mod webhook;

pub use company::{
    Company, CompanyStatus, CompanyUsage, CreateCompanyRequest, UpdateCompanyRequest, UsageMetric,
};
pub use evolution::{
    ConnectionState, CreateEvolutionConfigRequest, EvolutionConfig, SendTextRequest,
    UpdateEvolutionConfigRequest,
};
pub use message_template::{
    CreateTemplateRequest, MessageTemplate, PreviewTemplateRequest, TemplateCategory,
    UpdateTemplateRequest,
};
pub use plan::{BillingCycle, CreatePlanRequest, Plan, UpdatePlanRequest};
pub use scheduling::{
    CreateSchedulingRequest, Recurrence, Scheduling, SchedulingStatus, UpdateSchedulingRequest,
};
pub use smtp_config::{CreateSmtpConfigRequest, SmtpConfig, UpdateSmtpConfigRequest};
pub use sql_connection::{
    ConnectionStatus, CreateSqlConnectionRequest, DatabaseType, SqlConnection,
    UpdateSqlConnectionRequest,
};
pub use sql_query::{is_read_only, CreateSqlQueryRequest, SqlQuery, UpdateSqlQueryRequest};
pub use subscription::{
    CreateSubscriptionRequest, Subscription, SubscriptionStatus, UpdateSubscriptionRequest,
};
pub use system_config::{CreateSystemConfigRequest, SystemConfig, UpdateSystemConfigRequest};
pub use system_log::{CreateSystemLogRequest, LogLevel, NoUpdate, SystemLog};
pub use transaction::{
    CreateTransactionRequest, Transaction, TransactionStatus, UpdateTransactionRequest,
};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserRole};
pub use webhook::{
    CreateWebhookRequest, UpdateWebhookRequest, WebhookIntegration, SUPPORTED_EVENTS,
};

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "BRL".to_string()
}
