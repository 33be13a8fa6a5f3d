//! Notification sink used by the HTTP server.

use std::sync::Arc;

use async_trait::async_trait;
use domain::models::{CreateSystemLogRequest, SystemLog};
use domain::repository::Repository;
use domain::services::{Notification, Notifier, TracingNotifier};
use tracing::warn;

use crate::middleware::metrics::record_notification;

/// Logs every notification and stores it as a system log row.
///
/// Storage is best effort: a failed insert is logged and otherwise ignored.
pub struct SystemLogNotifier {
    logs: Arc<dyn Repository<SystemLog>>,
}

impl SystemLogNotifier {
    pub fn new(logs: Arc<dyn Repository<SystemLog>>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl Notifier for SystemLogNotifier {
    async fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone()).await;
        record_notification(notification.level);

        let input = CreateSystemLogRequest {
            level: notification.level,
            source: notification.source.clone(),
            message: format!("{}: {}", notification.title, notification.message),
            details: serde_json::json!({ "title": notification.title }),
            user_id: notification.actor_id,
        };

        if let Err(e) = self.logs.create(notification.company_id, &input).await {
            warn!(error = %e, source = %notification.source, "Failed to persist notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::LogLevel;
    use persistence::repositories::InMemoryRepository;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_notification_is_stored_for_company() {
        let logs = Arc::new(InMemoryRepository::<SystemLog>::new());
        let notifier = SystemLogNotifier::new(logs.clone());
        let company_id = Uuid::new_v4();

        let mut notification = Notification::error("Error creating template", "Name: Field is required")
            .with_source("template");
        notification.company_id = Some(company_id);
        notifier.notify(notification).await;

        let stored = logs.list(Some(company_id)).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].level, LogLevel::Error);
        assert_eq!(stored[0].source, "template");
        assert_eq!(
            stored[0].message,
            "Error creating template: Name: Field is required"
        );
        assert_eq!(stored[0].details["title"], "Error creating template");
    }

    #[tokio::test]
    async fn test_global_notification_has_no_company() {
        let logs = Arc::new(InMemoryRepository::<SystemLog>::new());
        let notifier = SystemLogNotifier::new(logs.clone());

        notifier
            .notify(Notification::success("Plan created", "Plan was created successfully"))
            .await;

        let stored = logs.list(None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].company_id.is_none());
    }
}
