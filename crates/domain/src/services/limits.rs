//! Plan limit enforcement.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Company, Plan};
use crate::repository::{LimitKind, Repository};
use crate::services::ServiceError;

/// Resolves a company's plan and compares usage against its limits.
///
/// Companies without an assigned plan are not limited.
#[derive(Clone)]
pub struct PlanLimitGuard {
    companies: Arc<dyn Repository<Company>>,
    plans: Arc<dyn Repository<Plan>>,
}

impl PlanLimitGuard {
    pub fn new(companies: Arc<dyn Repository<Company>>, plans: Arc<dyn Repository<Plan>>) -> Self {
        Self { companies, plans }
    }

    /// Plan assigned to the company, if any.
    pub async fn plan_for(&self, company_id: Uuid) -> Result<Option<Plan>, ServiceError> {
        let company = self
            .companies
            .find(Some(company_id), company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))?;

        match company.plan_id {
            Some(plan_id) => Ok(self.plans.find(None, plan_id).await?),
            None => Ok(None),
        }
    }

    /// Maximum allowed records of `kind` for the company, `None` when unlimited.
    pub async fn max_for(&self, company_id: Uuid, kind: LimitKind) -> Result<Option<i32>, ServiceError> {
        Ok(self.plan_for(company_id).await?.map(|plan| plan.limit_for(kind)))
    }

    /// Fails with `LimitReached` when `current` already meets the plan's maximum.
    pub async fn check(
        &self,
        company_id: Uuid,
        kind: LimitKind,
        current: i64,
    ) -> Result<(), ServiceError> {
        match self.max_for(company_id, kind).await? {
            Some(max) if current >= i64::from(max) => {
                tracing::warn!(
                    company_id = %company_id,
                    resource = kind.label(),
                    current = current,
                    max = max,
                    "Plan limit reached"
                );
                Err(ServiceError::LimitReached {
                    resource: kind.label(),
                    max,
                })
            }
            _ => Ok(()),
        }
    }
}
