//! User-facing notifications.
//!
//! Every write performed through a [`ResourceService`](super::ResourceService)
//! reports its outcome to a [`Notifier`]. The HTTP server persists them as
//! system logs; tests use [`RecordingNotifier`].

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::LogLevel;
use crate::services::TenantContext;

/// A single notification (level, title and message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: LogLevel,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    pub source: String,
}

impl Notification {
    pub fn new(level: LogLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            company_id: None,
            actor_id: None,
            source: "system".to_string(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, title, message)
    }

    /// Attaches the selected company and acting user.
    pub fn for_context(mut self, ctx: &TenantContext) -> Self {
        self.company_id = ctx.scope.company_id();
        self.actor_id = ctx.actor_id;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Sink for notifications. Implementations must not fail the caller.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Notifier that only writes to the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) {
        match notification.level {
            LogLevel::Error => tracing::error!(
                source = %notification.source,
                company_id = ?notification.company_id,
                title = %notification.title,
                "{}",
                notification.message
            ),
            LogLevel::Warning => tracing::warn!(
                source = %notification.source,
                company_id = ?notification.company_id,
                title = %notification.title,
                "{}",
                notification.message
            ),
            LogLevel::Info | LogLevel::Success => tracing::info!(
                source = %notification.source,
                company_id = ?notification.company_id,
                title = %notification.title,
                "{}",
                notification.message
            ),
        }
    }
}

/// Notifier that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TenantScope;

    #[test]
    fn test_for_context_copies_company_and_actor() {
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let ctx = TenantContext::new(TenantScope::Company(company), Some(actor));

        let n = Notification::success("Plan created", "ok").for_context(&ctx);

        assert_eq!(n.company_id, Some(company));
        assert_eq!(n.actor_id, Some(actor));
        assert_eq!(n.level, LogLevel::Success);
    }

    #[tokio::test]
    async fn test_recording_notifier_counts_levels() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success("a", "b")).await;
        notifier.notify(Notification::error("c", "d")).await;
        notifier.notify(Notification::error("e", "f")).await;

        assert_eq!(notifier.count(LogLevel::Error), 2);
        assert_eq!(notifier.count(LogLevel::Success), 1);
        assert_eq!(notifier.last().map(|n| n.title), Some("e".to_string()));
    }

    #[tokio::test]
    async fn test_tracing_notifier_accepts_every_level() {
        let notifier = TracingNotifier;
        for level in LogLevel::ALL {
            notifier.notify(Notification::new(*level, "t", "m")).await;
        }
    }

    #[test]
    fn test_notification_serialization_skips_empty_context() {
        let json = serde_json::to_string(&Notification::warning("Limit reached", "x")).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
        assert!(!json.contains("company_id"));
    }
}
