//! Message template domain model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::repository::{LimitKind, Resource, Scoping};
use crate::services::ServiceError;
use shared::validation::{extract_placeholders, render_placeholders, validate_not_blank};

text_enum!(
    TemplateCategory, "template category" {
        Marketing => "marketing",
        Utility => "utility",
        Authentication => "authentication",
    }
);

impl Default for TemplateCategory {
    fn default() -> Self {
        TemplateCategory::Utility
    }
}

/// Message template with `{{placeholder}}` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub content: String,
    pub variables: Vec<String>,
    pub category: TemplateCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageTemplate {
    /// Renders the content; placeholders without a value are kept verbatim.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        render_placeholders(&self.content, |name| values.get(name).cloned())
    }

    /// Variables of the template that `values` does not provide.
    pub fn missing_variables(&self, values: &HashMap<String, String>) -> Vec<String> {
        self.variables
            .iter()
            .filter(|v| !values.contains_key(v.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 4096, message = "Content must be at most 4096 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(skip)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 4096, message = "Content must be at most 4096 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: Option<String>,
    pub category: Option<TemplateCategory>,
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub variables: Option<Vec<String>>,
}

/// Values used to preview a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewTemplateRequest {
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl Resource for MessageTemplate {
    type Create = CreateTemplateRequest;
    type Update = UpdateTemplateRequest;

    const LABEL: &'static str = "template";
    const SCOPING: Scoping = Scoping::Tenant;
    const LIMIT: Option<LimitKind> = Some(LimitKind::Templates);

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateTemplateRequest,
        _company_id: Option<Uuid>,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        input.variables = extract_placeholders(&input.content);
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdateTemplateRequest,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        input.variables = input.content.as_deref().map(extract_placeholders);
        Ok(())
    }

    fn is_noop_update(input: &UpdateTemplateRequest) -> bool {
        input.name.is_none()
            && input.content.is_none()
            && input.category.is_none()
            && input.is_active.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateTemplateRequest,
        now: DateTime<Utc>,
    ) -> Self {
        MessageTemplate {
            id,
            company_id: company_id.unwrap_or_default(),
            name: input.name.clone(),
            content: input.content.clone(),
            variables: input.variables.clone(),
            category: input.category,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateTemplateRequest, now: DateTime<Utc>) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(content) = &input.content {
            self.content = content.clone();
        }
        if let Some(variables) = &input.variables {
            self.variables = variables.clone();
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(content: &str) -> MessageTemplate {
        let mut req = CreateTemplateRequest {
            name: "Boas-vindas".into(),
            content: content.into(),
            category: TemplateCategory::Marketing,
            is_active: true,
            variables: vec![],
        };
        MessageTemplate::prepare_create(&mut req, None, Utc::now()).unwrap();
        MessageTemplate::materialize(Uuid::new_v4(), Some(Uuid::new_v4()), &req, Utc::now())
    }

    #[test]
    fn test_variables_extracted_on_create() {
        let t = template("Olá {{nome}}, seu pedido {{pedido}} saiu. {{nome}}");
        assert_eq!(t.variables, vec!["nome".to_string(), "pedido".to_string()]);
    }

    #[test]
    fn test_variables_refreshed_only_when_content_changes() {
        let mut update = UpdateTemplateRequest {
            name: Some("Novo".into()),
            ..Default::default()
        };
        MessageTemplate::prepare_update(&mut update, Utc::now()).unwrap();
        assert!(update.variables.is_none());

        update.content = Some("Oi {{cliente}}".into());
        MessageTemplate::prepare_update(&mut update, Utc::now()).unwrap();
        assert_eq!(update.variables, Some(vec!["cliente".to_string()]));
    }

    #[test]
    fn test_render_and_missing_variables() {
        let t = template("Olá {{nome}}, código {{codigo}}");
        let mut values = HashMap::new();
        values.insert("nome".to_string(), "Ana".to_string());

        assert_eq!(t.render(&values), "Olá Ana, código {{codigo}}");
        assert_eq!(t.missing_variables(&values), vec!["codigo".to_string()]);
    }

    #[test]
    fn test_category_default() {
        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"name":"Aviso","content":"Oi"}"#).unwrap();
        assert_eq!(req.category, TemplateCategory::Utility);
        assert!(req.variables.is_empty());
    }
}
