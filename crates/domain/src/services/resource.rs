//! Generic CRUD service shared by every resource.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::error::capitalize;
use crate::models::LogLevel;
use crate::repository::{Repository, Resource, Scoping};
use crate::services::{Notification, Notifier, PlanLimitGuard, ServiceError, TenantContext};

/// Validates, guards and persists one resource type, reporting every
/// outcome to the notifier.
pub struct ResourceService<R: Resource> {
    repo: Arc<dyn Repository<R>>,
    notifier: Arc<dyn Notifier>,
    limits: Option<PlanLimitGuard>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: self.notifier.clone(),
            limits: self.limits.clone(),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            limits: None,
        }
    }

    /// Enables plan limit checks for resources declaring a `LIMIT`.
    pub fn with_limits(mut self, limits: PlanLimitGuard) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository<R>> {
        &self.repo
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Lists the records visible in the context's scope.
    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<R>, ServiceError> {
        let Some(filter) = ctx.scope.filter() else {
            return Ok(Vec::new());
        };

        match self.repo.list(filter).await {
            Ok(items) => Ok(items),
            Err(e) => {
                let err = ServiceError::from(e);
                self.report_failure(ctx, "loading", &err).await;
                Err(err)
            }
        }
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<R, ServiceError> {
        let Some(filter) = ctx.scope.filter() else {
            return Err(ServiceError::not_found(R::LABEL));
        };

        self.repo
            .find(filter, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::LABEL))
    }

    pub async fn create(&self, ctx: &TenantContext, input: R::Create) -> Result<R, ServiceError> {
        match self.try_create(ctx, input).await {
            Ok(record) => {
                tracing::info!(
                    resource = R::LABEL,
                    id = %record.id(),
                    company_id = ?record.company_id(),
                    "Record created"
                );
                if R::NOTIFY_SUCCESS {
                    self.report_success(ctx, "created").await;
                }
                Ok(record)
            }
            Err(err) => {
                self.report_failure(ctx, "creating", &err).await;
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: R::Update,
    ) -> Result<R, ServiceError> {
        match self.try_update(ctx, id, input).await {
            Ok(record) => {
                tracing::info!(resource = R::LABEL, id = %id, "Record updated");
                if R::NOTIFY_SUCCESS {
                    self.report_success(ctx, "updated").await;
                }
                Ok(record)
            }
            Err(err) => {
                self.report_failure(ctx, "updating", &err).await;
                Err(err)
            }
        }
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        match self.try_delete(ctx, id).await {
            Ok(()) => {
                tracing::info!(resource = R::LABEL, id = %id, "Record deleted");
                if R::NOTIFY_SUCCESS {
                    self.report_success(ctx, "deleted").await;
                }
                Ok(())
            }
            Err(err) => {
                self.report_failure(ctx, "deleting", &err).await;
                Err(err)
            }
        }
    }

    async fn try_create(
        &self,
        ctx: &TenantContext,
        mut input: R::Create,
    ) -> Result<R, ServiceError> {
        input.validate()?;

        let company_id = self.owning_company(ctx, &input)?;
        R::prepare_create(&mut input, company_id, Utc::now())?;

        if let (Some(kind), Some(company_id), Some(limits)) = (R::LIMIT, company_id, &self.limits) {
            let current = self.repo.count_for_company(company_id).await?;
            limits.check(company_id, kind, current).await?;
        }

        Ok(self.repo.create(company_id, &input).await?)
    }

    async fn try_update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        mut input: R::Update,
    ) -> Result<R, ServiceError> {
        input.validate()?;
        if R::is_noop_update(&input) {
            return Err(ServiceError::validation("No fields to update"));
        }
        R::prepare_update(&mut input, Utc::now())?;

        let Some(filter) = ctx.scope.filter() else {
            return Err(ServiceError::not_found(R::LABEL));
        };

        self.repo
            .update(filter, id, &input)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::LABEL))
    }

    async fn try_delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        let Some(filter) = ctx.scope.filter() else {
            return Err(ServiceError::not_found(R::LABEL));
        };

        if self.repo.delete(filter, id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(R::LABEL))
        }
    }

    /// Company a new record will belong to.
    fn owning_company(
        &self,
        ctx: &TenantContext,
        input: &R::Create,
    ) -> Result<Option<Uuid>, ServiceError> {
        match R::SCOPING {
            Scoping::Global | Scoping::Company => Ok(None),
            Scoping::Tenant => ctx
                .scope
                .company_id()
                .map(Some)
                .ok_or_else(|| ServiceError::validation("Select a company first")),
            Scoping::OptionalTenant => {
                Ok(ctx.scope.company_id().or_else(|| R::requested_company(input)))
            }
        }
    }

    async fn report_success(&self, ctx: &TenantContext, action: &str) {
        let title = format!("{} {}", capitalize(R::LABEL), action);
        let message = format!("{} was {} successfully", capitalize(R::LABEL), action);
        self.notifier
            .notify(Notification::success(title, message).for_context(ctx).with_source(R::LABEL))
            .await;
    }

    async fn report_failure(&self, ctx: &TenantContext, action: &str, err: &ServiceError) {
        let (level, title) = match err {
            ServiceError::LimitReached { .. } => (LogLevel::Warning, "Limit reached".to_string()),
            _ => (LogLevel::Error, format!("Error {} {}", action, R::LABEL)),
        };

        if err.is_client_error() {
            tracing::warn!(resource = R::LABEL, action = action, error = %err, "Operation rejected");
        } else {
            tracing::error!(resource = R::LABEL, action = action, error = %err, "Operation failed");
        }

        self.notifier
            .notify(
                Notification::new(level, title, err.to_string())
                    .for_context(ctx)
                    .with_source(R::LABEL),
            )
            .await;
    }
}
