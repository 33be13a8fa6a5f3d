//! Company (tenant) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repository::{Resource, Scoping};
use shared::validation::{validate_not_blank, validate_phone};

text_enum!(
    CompanyStatus, "company status" {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

impl Default for CompanyStatus {
    fn default() -> Self {
        CompanyStatus::Active
    }
}

/// Company domain model. Every tenant-scoped record belongs to one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<Uuid>,
    pub status: CompanyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn is_active(&self) -> bool {
        self.status == CompanyStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be 2-255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(min = 5, max = 32, message = "Document must be 5-32 characters"))]
    pub document: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub status: CompanyStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be 2-255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 5, max = 32, message = "Document must be 5-32 characters"))]
    pub document: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub plan_id: Option<Uuid>,
    pub status: Option<CompanyStatus>,
}

/// Current usage of a company against its plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUsage {
    pub company_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub users: UsageMetric,
    pub sql_connections: UsageMetric,
    pub sql_queries: UsageMetric,
    pub templates: UsageMetric,
    pub schedulings: UsageMetric,
}

/// Usage of one limited resource; `max` is absent when the company has no plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageMetric {
    pub current: i64,
    pub max: Option<i32>,
    pub percentage: Option<f64>,
}

impl UsageMetric {
    pub fn new(current: i64, max: Option<i32>) -> Self {
        let percentage = max.map(|max| {
            if max <= 0 {
                100.0
            } else {
                (current as f64 / f64::from(max) * 100.0).min(100.0)
            }
        });
        Self {
            current,
            max,
            percentage,
        }
    }
}

impl Resource for Company {
    type Create = CreateCompanyRequest;
    type Update = UpdateCompanyRequest;

    const LABEL: &'static str = "company";
    const SCOPING: Scoping = Scoping::Company;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn is_noop_update(input: &UpdateCompanyRequest) -> bool {
        input.name.is_none()
            && input.document.is_none()
            && input.email.is_none()
            && input.phone.is_none()
            && input.plan_id.is_none()
            && input.status.is_none()
    }

    fn materialize(
        id: Uuid,
        _company_id: Option<Uuid>,
        input: &CreateCompanyRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Company {
            id,
            name: input.name.clone(),
            document: input.document.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            plan_id: input.plan_id,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateCompanyRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(document) = &input.document {
            self.document = Some(document.clone());
        }
        if let Some(email) = &input.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &input.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(plan_id) = input.plan_id {
            self.plan_id = Some(plan_id);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str) -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: name.to_string(),
            document: None,
            email: Some("contato@acme.com.br".into()),
            phone: Some("+5511999990000".into()),
            plan_id: None,
            status: CompanyStatus::Active,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(create_request("Acme Ltda").validate().is_ok());
        assert!(create_request("").validate().is_err());
        assert!(create_request("   ").validate().is_err());

        let mut bad_phone = create_request("Acme Ltda");
        bad_phone.phone = Some("12-34".into());
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn test_company_is_its_own_tenant() {
        let company = Company::materialize(Uuid::new_v4(), None, &create_request("Acme"), Utc::now());
        assert_eq!(company.company_id(), Some(company.id));
        assert!(company.visible_to(Some(company.id)));
        assert!(!company.visible_to(Some(Uuid::new_v4())));
        assert!(company.visible_to(None));
    }

    #[test]
    fn test_apply_update_keeps_unset_fields() {
        let mut company =
            Company::materialize(Uuid::new_v4(), None, &create_request("Acme"), Utc::now());
        let update = UpdateCompanyRequest {
            status: Some(CompanyStatus::Suspended),
            ..Default::default()
        };

        company.apply_update(&update, Utc::now());

        assert_eq!(company.name, "Acme");
        assert_eq!(company.status, CompanyStatus::Suspended);
        assert!(!company.is_active());
    }

    #[test]
    fn test_usage_metric_percentage() {
        assert_eq!(UsageMetric::new(5, Some(10)).percentage, Some(50.0));
        assert_eq!(UsageMetric::new(12, Some(10)).percentage, Some(100.0));
        assert_eq!(UsageMetric::new(3, None).percentage, None);
        assert_eq!(UsageMetric::new(0, Some(0)).percentage, Some(100.0));
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<CompanyStatus>("\"archived\"").is_err());
        assert_eq!("Suspended".parse::<CompanyStatus>().unwrap(), CompanyStatus::Suspended);
    }
}
