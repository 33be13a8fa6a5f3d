//! Plan route handlers. Plans are global: everyone reads, masters write.

use std::sync::Arc;

use axum::Router;
use domain::models::Plan;
use domain::repository::Repository;

use super::crud::{self, Action, CrudResource};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

impl CrudResource for Plan {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repos.plans.clone()
    }

    fn authorize(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
        if action.is_write() {
            user.require_master()
        } else {
            Ok(())
        }
    }
}

pub fn router() -> Router<AppState> {
    crud::router::<Plan>()
}
