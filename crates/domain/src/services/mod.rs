//! Domain services.
//!
//! [`ResourceService`] is the stateless entry point used by the HTTP layer.
//! [`ResourceStore`] is the library-side stateful client: it layers a locally
//! held list on top of a service for embedding callers and is not used by
//! the server.

pub mod error;
pub mod limits;
pub mod notification;
pub mod resource;
pub mod store;
pub mod tenant;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ServiceError;
pub use limits::PlanLimitGuard;
pub use notification::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use resource::ResourceService;
pub use store::ResourceStore;
pub use tenant::{TenantContext, TenantScope};
