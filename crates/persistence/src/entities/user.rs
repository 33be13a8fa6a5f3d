//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::User;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserEntity> for User {
    type Error = RepositoryError;

    fn try_from(entity: UserEntity) -> Result<Self, Self::Error> {
        Ok(User {
            id: entity.id,
            company_id: entity.company_id,
            email: entity.email,
            name: entity.name,
            role: parse_column("users", "role", &entity.role)?,
            is_active: entity.is_active,
            password_hash: entity.password_hash,
            last_login_at: entity.last_login_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::UserRole;

    #[test]
    fn test_entity_to_domain() {
        let user = User::try_from(UserEntity {
            id: Uuid::new_v4(),
            company_id: None,
            email: "root@example.com".to_string(),
            name: "Root".to_string(),
            role: "master".to_string(),
            is_active: true,
            password_hash: "$argon2id$v=19$...".to_string(),
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(user.role, UserRole::Master);
        assert!(user.company_id.is_none());
    }
}
