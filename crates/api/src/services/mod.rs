//! Server-side services: outbound integrations, notification storage and startup tasks.

pub mod bootstrap;
pub mod evolution_client;
pub mod evolution_store;
pub mod notifier;
pub mod probe;
pub mod sql_executor;
pub mod webhook_tester;

pub use bootstrap::bootstrap_master;
pub use evolution_client::{EvolutionClient, EvolutionError};
pub use evolution_store::EvolutionFallbackStore;
pub use notifier::SystemLogNotifier;
pub use sql_executor::{ExecutorError, QueryResult, SqlExecutor};
pub use webhook_tester::{WebhookTestOutcome, WebhookTester};
