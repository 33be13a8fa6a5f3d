//! Master account bootstrap.
//!
//! Creates the first master user on startup when `bootstrap.master_email` is
//! configured and no user has that email yet. Running it again does nothing.

use domain::models::{CreateUserRequest, User, UserRole};
use domain::services::{ResourceService, ServiceError, TenantContext};
use persistence::repositories::Repositories;
use tracing::{info, warn};

use crate::config::BootstrapConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Could not create master user: {0}")]
    Service(#[from] ServiceError),
}

/// Returns the created user, or `None` when nothing had to be done.
pub async fn bootstrap_master(
    repos: &Repositories,
    users: &ResourceService<User>,
    config: &BootstrapConfig,
) -> Result<Option<User>, BootstrapError> {
    if config.master_email.is_empty() {
        return Ok(None);
    }

    if config.master_password.is_empty() {
        warn!("TA__BOOTSTRAP__MASTER_EMAIL is set but TA__BOOTSTRAP__MASTER_PASSWORD is empty - skipping bootstrap");
        return Ok(None);
    }

    let existing = repos
        .user_directory
        .find_by_email(&config.master_email)
        .await
        .map_err(ServiceError::from)?;
    if existing.is_some() {
        info!("Master user already exists - skipping bootstrap");
        return Ok(None);
    }

    let user = users
        .create(
            &TenantContext::system(),
            CreateUserRequest {
                company_id: None,
                email: config.master_email.clone(),
                name: config.master_name.clone(),
                password: config.master_password.clone(),
                role: UserRole::Master,
                is_active: true,
                password_hash: String::new(),
            },
        )
        .await?;

    info!(user_id = %user.id, email = %user.email, "Master user bootstrapped");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::RecordingNotifier;
    use std::sync::Arc;

    fn config(email: &str, password: &str) -> BootstrapConfig {
        BootstrapConfig {
            master_email: email.into(),
            master_password: password.into(),
            master_name: "Master".into(),
        }
    }

    fn users(repos: &Repositories) -> ResourceService<User> {
        ResourceService::new(repos.users.clone(), Arc::new(RecordingNotifier::new()))
    }

    #[tokio::test]
    async fn test_creates_master_once() {
        let repos = Repositories::in_memory();
        let service = users(&repos);
        let cfg = config("Root@Example.com", "correct-horse-battery");

        let created = bootstrap_master(&repos, &service, &cfg).await.unwrap().unwrap();
        assert_eq!(created.role, UserRole::Master);
        assert_eq!(created.email, "root@example.com");
        assert!(created.company_id.is_none());

        assert!(bootstrap_master(&repos, &service, &cfg).await.unwrap().is_none());
        assert_eq!(repos.users.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_or_passwordless_is_skipped() {
        let repos = Repositories::in_memory();
        let service = users(&repos);

        assert!(bootstrap_master(&repos, &service, &config("", ""))
            .await
            .unwrap()
            .is_none());
        assert!(bootstrap_master(&repos, &service, &config("root@example.com", ""))
            .await
            .unwrap()
            .is_none());
        assert!(repos.users.list(None).await.unwrap().is_empty());
    }
}
