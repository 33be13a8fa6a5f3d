//! Locally held list over a [`ResourceService`].
//!
//! This is the library-side stateful client for callers that embed the
//! domain crate and keep a working list between calls. The HTTP server is
//! stateless per request and talks to [`ResourceService`] directly.

use uuid::Uuid;

use crate::repository::Resource;
use crate::services::{ResourceService, ServiceError, TenantContext};

/// Keeps the records of one scope in memory and mirrors successful writes
/// into that list.
///
/// Load failures leave an empty list (the service has already notified);
/// write failures keep the list untouched and are returned to the caller.
pub struct ResourceStore<R: Resource> {
    service: ResourceService<R>,
    ctx: TenantContext,
    items: Vec<R>,
    loading: bool,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(service: ResourceService<R>, ctx: TenantContext) -> Self {
        Self {
            service,
            ctx,
            items: Vec::new(),
            loading: false,
        }
    }

    /// Builds a store and loads its first page of data.
    pub async fn load(service: ResourceService<R>, ctx: TenantContext) -> Self {
        let mut store = Self::new(service, ctx);
        store.refresh().await;
        store
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn context(&self) -> &TenantContext {
        &self.ctx
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        self.items = self.service.list(&self.ctx).await.unwrap_or_default();
        self.loading = false;
    }

    /// Switches to another company (or none) and reloads.
    pub async fn select(&mut self, ctx: TenantContext) {
        self.ctx = ctx;
        self.refresh().await;
    }

    pub async fn create(&mut self, input: R::Create) -> Result<R, ServiceError> {
        let record = self.service.create(&self.ctx, input).await?;
        self.items.insert(0, record.clone());
        Ok(record)
    }

    pub async fn update(&mut self, id: Uuid, input: R::Update) -> Result<R, ServiceError> {
        let record = self.service.update(&self.ctx, id, input).await?;
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
            *slot = record.clone();
        }
        Ok(record)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ServiceError> {
        self.service.delete(&self.ctx, id).await?;
        self.items.retain(|item| item.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{CreateTemplateRequest, LogLevel, MessageTemplate, UpdateTemplateRequest};
    use crate::services::testing::FakeRepository;
    use crate::services::RecordingNotifier;

    fn template_request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            content: "Olá {{nome}}".into(),
            category: Default::default(),
            is_active: true,
            variables: vec![],
        }
    }

    async fn store_with(
        existing: usize,
    ) -> (
        ResourceStore<MessageTemplate>,
        Arc<FakeRepository<MessageTemplate>>,
        Arc<RecordingNotifier>,
    ) {
        let company_id = uuid::Uuid::new_v4();
        let records = (0..existing)
            .map(|i| {
                MessageTemplate::materialize(
                    uuid::Uuid::new_v4(),
                    Some(company_id),
                    &template_request(&format!("Modelo {}", i)),
                    chrono::Utc::now(),
                )
            })
            .collect();
        let repo = Arc::new(FakeRepository::with_records(records));
        let notifier = Arc::new(RecordingNotifier::new());
        let service = ResourceService::new(repo.clone(), notifier.clone());
        let store = ResourceStore::load(service, TenantContext::company(company_id)).await;
        (store, repo, notifier)
    }

    #[tokio::test]
    async fn test_create_prepends_record() {
        let (mut store, _repo, notifier) = store_with(2).await;

        let created = store.create(template_request("Novo modelo")).await.unwrap();

        assert_eq!(store.items().len(), 3);
        assert_eq!(store.items()[0].id, created.id);
        assert_eq!(created.variables, vec!["nome".to_string()]);
        assert_eq!(notifier.last().unwrap().level, LogLevel::Success);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let (mut store, _repo, _notifier) = store_with(3).await;
        let target = store.items()[1].id;

        store
            .update(
                target,
                UpdateTemplateRequest {
                    name: Some("Renomeado".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.items().len(), 3);
        assert_eq!(store.items()[1].name, "Renomeado");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let (mut store, repo, notifier) = store_with(2).await;
        let before: Vec<_> = store.items().iter().map(|t| t.id).collect();
        repo.fail_writes(true);

        let result = store.delete(before[0]).await;

        assert!(result.is_err());
        let after: Vec<_> = store.items().iter().map(|t| t.id).collect();
        assert_eq!(before, after);
        let note = notifier.last().unwrap();
        assert_eq!(note.level, LogLevel::Error);
        assert_eq!(note.title, "Error deleting template");
    }

    #[tokio::test]
    async fn test_successful_delete_removes_record() {
        let (mut store, _repo, _notifier) = store_with(2).await;
        let target = store.items()[0].id;

        store.delete(target).await.unwrap();

        assert_eq!(store.items().len(), 1);
        assert!(store.items().iter().all(|t| t.id != target));
    }

    #[tokio::test]
    async fn test_refresh_failure_yields_empty_list() {
        let (mut store, repo, notifier) = store_with(2).await;
        repo.fail_reads(true);

        store.refresh().await;

        assert!(store.items().is_empty());
        assert!(!store.is_loading());
        assert_eq!(notifier.count(LogLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_selecting_no_company_empties_list() {
        let (mut store, repo, _notifier) = store_with(2).await;
        let calls = repo.calls();

        store.select(TenantContext::unselected()).await;

        assert!(store.items().is_empty());
        assert_eq!(repo.calls(), calls);
        assert_eq!(store.context().scope, crate::services::TenantScope::Unselected);
    }
}
