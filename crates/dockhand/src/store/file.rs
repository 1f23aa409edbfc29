//! File-backed store: a single JSON document holding the whole catalog.
//!
//! Every mutation is a full read-modify-write cycle with no cross-process
//! locking, so concurrent writers from multiple processes can silently
//! overwrite each other. That limitation is accepted for this backend;
//! deployments needing concurrent writers should use the document store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app::{apply_patch, validate_new, AppPatch, AppRecord};
use crate::compose::ComposeResolver;
use crate::error::{CatalogError, CatalogResult};
use crate::store::AppStore;

/// On-disk layout: `{ "apps": [ ... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    apps: Vec<AppRecord>,
}

pub struct FileStore {
    path: PathBuf,
    resolver: ComposeResolver,
}

impl FileStore {
    pub fn new(path: PathBuf, resolver: ComposeResolver) -> Self {
        Self { path, resolver }
    }

    /// Reads and parses the whole document. A missing file is an empty
    /// catalog; anything else that fails maps to `StoreUnavailable`.
    async fn load(&self) -> CatalogResult<Document> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Document::default())
            }
            Err(error) => {
                return Err(CatalogError::StoreUnavailable(format!(
                    "failed to read catalog file {}: {error}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_slice(&bytes).map_err(|error| {
            CatalogError::StoreUnavailable(format!(
                "failed to parse catalog file {}: {error}",
                self.path.display()
            ))
        })
    }

    async fn save(&self, document: &Document) -> CatalogResult<()> {
        Self::ensure_parent_dir(&self.path).await?;
        let serialized = serde_json::to_vec_pretty(document).map_err(|error| {
            CatalogError::StoreUnavailable(format!("failed to serialize catalog: {error}"))
        })?;
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|error| {
                CatalogError::StoreUnavailable(format!(
                    "failed to write catalog file {}: {error}",
                    self.path.display()
                ))
            })
    }

    async fn ensure_parent_dir(path: &Path) -> CatalogResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                CatalogError::StoreUnavailable(format!(
                    "failed to create catalog directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl AppStore for FileStore {
    async fn list_apps(&self) -> CatalogResult<Vec<AppRecord>> {
        Ok(self.load().await?.apps)
    }

    async fn get_app(&self, id: &str) -> CatalogResult<AppRecord> {
        self.load()
            .await?
            .apps
            .into_iter()
            .find(|app| app.id == id)
            .ok_or_else(|| CatalogError::NotFound("App not found".to_string()))
    }

    async fn create_app(&self, record: AppRecord) -> CatalogResult<AppRecord> {
        validate_new(&record)?;
        let mut document = self.load().await?;
        if document.apps.iter().any(|app| app.id == record.id) {
            return Err(CatalogError::Conflict(format!(
                "app with id {} already exists",
                record.id
            )));
        }
        document.apps.push(record.clone());
        self.save(&document).await?;
        Ok(record)
    }

    async fn update_app(&self, id: &str, patch: AppPatch) -> CatalogResult<()> {
        let mut document = self.load().await?;
        let position = document
            .apps
            .iter()
            .position(|app| app.id == id)
            .ok_or_else(|| CatalogError::NotFound("App not found".to_string()))?;
        let merged = apply_patch(&document.apps[position], &patch)?;
        document.apps[position] = merged;
        self.save(&document).await
    }

    async fn delete_app(&self, id: &str) -> CatalogResult<()> {
        let mut document = self.load().await?;
        let position = document
            .apps
            .iter()
            .position(|app| app.id == id)
            .ok_or_else(|| CatalogError::NotFound("App not found".to_string()))?;
        document.apps.remove(position);
        self.save(&document).await
    }

    async fn resolve_compose_url(&self, id: &str) -> CatalogResult<String> {
        let record = self.get_app(id).await?;
        self.resolver.resolve(&record).await
    }
}
