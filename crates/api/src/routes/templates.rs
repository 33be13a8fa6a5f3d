//! Message template route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use domain::models::{MessageTemplate, PreviewTemplateRequest};
use domain::repository::Repository;
use serde::Serialize;
use uuid::Uuid;

use super::crud::{self, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Tenant;

impl CrudResource for MessageTemplate {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.templates.clone()
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<MessageTemplate>().route("/:id/preview", post(preview_template))
}

#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub content: String,
    pub missing_variables: Vec<String>,
}

/// Render a template with sample values.
///
/// POST /api/v1/templates/:id/preview
///
/// Variables without a value are left as `{{name}}` and listed in
/// `missing_variables`.
async fn preview_template(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(request): Json<PreviewTemplateRequest>,
) -> Result<Json<TemplatePreview>, ApiError> {
    let template = crud::ensure_visible(&state.repos.templates, &tenant, id).await?;

    Ok(Json(TemplatePreview {
        content: template.render(&request.values),
        missing_variables: template.missing_variables(&request.values),
    }))
}
