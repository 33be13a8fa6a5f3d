//! In-memory repository backend.
//!
//! Used when the server runs without a database URL and by the HTTP
//! integration tests. Records are kept newest first, mirroring the
//! `ORDER BY created_at DESC` of the PostgreSQL repositories.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{SystemLog, User};
use domain::repository::{LogRetention, Repository, RepositoryError, Resource, UserDirectory};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct InMemoryRepository<R: Resource> {
    records: RwLock<Vec<R>>,
}

impl<R: Resource> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<R: Resource> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for InMemoryRepository<R> {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<R>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.visible_to(company))
            .cloned()
            .collect())
    }

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<R>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.id() == id && r.visible_to(company))
            .cloned())
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.company_id() == Some(company_id))
            .count() as i64)
    }

    async fn create(
        &self,
        company_id: Option<Uuid>,
        input: &R::Create,
    ) -> Result<R, RepositoryError> {
        let record = R::materialize(Uuid::new_v4(), company_id, input, Utc::now());
        let mut records = self.records.write().await;

        if let Some(key) = record.unique_key() {
            if records.iter().any(|r| r.unique_key().as_deref() == Some(key.as_str())) {
                return Err(RepositoryError::Conflict(format!(
                    "{} '{}' already exists",
                    R::LABEL,
                    key
                )));
            }
        }

        records.insert(0, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &R::Update,
    ) -> Result<Option<R>, RepositoryError> {
        let mut records = self.records.write().await;
        match records
            .iter_mut()
            .find(|r| r.id() == id && r.visible_to(company))
        {
            Some(record) => {
                record.apply_update(input, Utc::now());
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.id() == id && r.visible_to(company)));
        Ok(records.len() != before)
    }
}

#[async_trait]
impl UserDirectory for InMemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl LogRetention for InMemoryRepository<SystemLog> {
    async fn clear(&self, company: Option<Uuid>) -> Result<u64, RepositoryError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|log| !log.visible_to(company));
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{
        CreatePlanRequest, CreateSystemConfigRequest, CreateSystemLogRequest, CreateTemplateRequest,
        LogLevel, MessageTemplate, Plan, SystemConfig, TemplateCategory, UpdateTemplateRequest,
    };

    fn template_request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            content: "Olá {{nome}}".to_string(),
            category: TemplateCategory::Utility,
            is_active: true,
            variables: vec!["nome".to_string()],
        }
    }

    fn log_request(message: &str) -> CreateSystemLogRequest {
        CreateSystemLogRequest {
            level: LogLevel::Info,
            source: "test".to_string(),
            message: message.to_string(),
            details: serde_json::Value::Null,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_lists_newest_first() {
        let repo = InMemoryRepository::<MessageTemplate>::new();
        let company = Uuid::new_v4();

        repo.create(Some(company), &template_request("first")).await.unwrap();
        repo.create(Some(company), &template_request("second")).await.unwrap();

        let names: Vec<_> = repo
            .list(Some(company))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_tenant_filter_applies_to_every_operation() {
        let repo = InMemoryRepository::<MessageTemplate>::new();
        let company_a = Uuid::new_v4();
        let company_b = Uuid::new_v4();
        let record = repo
            .create(Some(company_a), &template_request("a"))
            .await
            .unwrap();

        assert!(repo.list(Some(company_b)).await.unwrap().is_empty());
        assert!(repo.find(Some(company_b), record.id).await.unwrap().is_none());
        let update = UpdateTemplateRequest {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(repo
            .update(Some(company_b), record.id, &update)
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete(Some(company_b), record.id).await.unwrap());

        assert_eq!(repo.list(None).await.unwrap().len(), 1);
        assert!(repo.delete(None, record.id).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_count_for_company() {
        let repo = InMemoryRepository::<MessageTemplate>::new();
        let company = Uuid::new_v4();
        for name in ["a", "b", "c"] {
            repo.create(Some(company), &template_request(name)).await.unwrap();
        }
        repo.create(Some(Uuid::new_v4()), &template_request("other"))
            .await
            .unwrap();

        assert_eq!(repo.count_for_company(company).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unique_key_conflict() {
        let repo = InMemoryRepository::<SystemConfig>::new();
        let input = CreateSystemConfigRequest {
            key: "billing.grace_days".to_string(),
            value: serde_json::json!(5),
            description: None,
        };

        repo.create(None, &input).await.unwrap();
        let err = repo.create(None, &input).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_global_records_ignore_tenant_filter() {
        let repo = InMemoryRepository::<Plan>::new();
        let input = CreatePlanRequest {
            name: "Pro".to_string(),
            description: None,
            price_cents: 9900,
            currency: "BRL".to_string(),
            billing_cycle: Default::default(),
            max_users: 5,
            max_sql_connections: 2,
            max_sql_queries: 5,
            max_templates: 10,
            max_schedulings: 10,
            is_active: true,
        };
        repo.create(None, &input).await.unwrap();

        assert_eq!(repo.list(Some(Uuid::new_v4())).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_logs_only_within_scope() {
        let repo = InMemoryRepository::<SystemLog>::new();
        let company = Uuid::new_v4();
        repo.create(Some(company), &log_request("mine")).await.unwrap();
        repo.create(Some(Uuid::new_v4()), &log_request("other"))
            .await
            .unwrap();
        repo.create(None, &log_request("global")).await.unwrap();

        assert_eq!(repo.clear(Some(company)).await.unwrap(), 1);
        assert_eq!(repo.len().await, 2);
        assert_eq!(repo.clear(None).await.unwrap(), 2);
        assert!(repo.is_empty().await);
    }
}
