//! Message template entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::MessageTemplate;
use domain::repository::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Database row mapping for the message_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageTemplateEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub content: String,
    pub variables: Vec<String>,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MessageTemplateEntity> for MessageTemplate {
    type Error = RepositoryError;

    fn try_from(entity: MessageTemplateEntity) -> Result<Self, Self::Error> {
        Ok(MessageTemplate {
            id: entity.id,
            company_id: entity.company_id,
            name: entity.name,
            content: entity.content,
            variables: entity.variables,
            category: parse_column("message_templates", "category", &entity.category)?,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TemplateCategory;

    #[test]
    fn test_entity_to_domain() {
        let template = MessageTemplate::try_from(MessageTemplateEntity {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Código de acesso".to_string(),
            content: "Seu código é {{codigo}}".to_string(),
            variables: vec!["codigo".to_string()],
            category: "authentication".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(template.category, TemplateCategory::Authentication);
        assert_eq!(template.variables, vec!["codigo".to_string()]);
    }
}
