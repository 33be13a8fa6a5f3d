//! Local file copy of each company's Evolution API configuration.
//!
//! Used when the `evolution_configs` table cannot be read or written, so a
//! company keeps its gateway settings while the database is unavailable.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use domain::models::EvolutionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FallbackStoreError {
    #[error("Fallback file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fallback file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk form. Unlike the API representation it keeps the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredConfig {
    id: Uuid,
    company_id: Uuid,
    api_url: String,
    api_key: String,
    instance_name: String,
    webhook_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&EvolutionConfig> for StoredConfig {
    fn from(c: &EvolutionConfig) -> Self {
        Self {
            id: c.id,
            company_id: c.company_id,
            api_url: c.api_url.clone(),
            api_key: c.api_key.clone(),
            instance_name: c.instance_name.clone(),
            webhook_url: c.webhook_url.clone(),
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<StoredConfig> for EvolutionConfig {
    fn from(c: StoredConfig) -> Self {
        Self {
            id: c.id,
            company_id: c.company_id,
            api_url: c.api_url,
            api_key: c.api_key,
            instance_name: c.instance_name,
            webhook_url: c.webhook_url,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvolutionFallbackStore {
    dir: PathBuf,
}

impl EvolutionFallbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, company_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", company_id))
    }

    pub async fn load(&self, company_id: Uuid) -> Result<Option<EvolutionConfig>, FallbackStoreError> {
        match tokio::fs::read(self.path_for(company_id)).await {
            Ok(bytes) => {
                let stored: StoredConfig = serde_json::from_slice(&bytes)?;
                Ok(Some(stored.into()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, config: &EvolutionConfig) -> Result<(), FallbackStoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_vec_pretty(&StoredConfig::from(config))?;

        // Write then rename so a crash never leaves a truncated file.
        let target = self.path_for(config.company_id);
        let tmp = target.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }

    pub async fn remove(&self, company_id: Uuid) -> Result<bool, FallbackStoreError> {
        match tokio::fs::remove_file(self.path_for(company_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
