//! Company entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Company;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the companies table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyEntity {
    pub id: Uuid,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyEntity> for Company {
    type Error = RepositoryError;

    fn try_from(entity: CompanyEntity) -> Result<Self, Self::Error> {
        Ok(Company {
            id: entity.id,
            name: entity.name,
            document: entity.document,
            email: entity.email,
            phone: entity.phone,
            plan_id: entity.plan_id,
            status: parse_column("companies", "status", &entity.status)?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::CompanyStatus;

    fn entity(status: &str) -> CompanyEntity {
        CompanyEntity {
            id: Uuid::new_v4(),
            name: "Acme Ltda".to_string(),
            document: Some("12.345.678/0001-90".to_string()),
            email: None,
            phone: None,
            plan_id: None,
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let company = Company::try_from(entity("suspended")).unwrap();
        assert_eq!(company.status, CompanyStatus::Suspended);
        assert_eq!(company.name, "Acme Ltda");
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let err = Company::try_from(entity("archived")).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Corrupt("companies.status: Unknown company status: archived".into())
        );
    }
}
