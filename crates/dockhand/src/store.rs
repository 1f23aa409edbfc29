pub mod file;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::app::{AppPatch, AppRecord};
use crate::error::CatalogResult;

/// Uniform CRUD contract over [`AppRecord`], independent of backend.
///
/// Both backends enforce the same invariants: one record per id, ids
/// assigned by the caller and immutable, `name`/`description` required on
/// create. Identifier conventions native to a backend (`_id` in the
/// document store) are normalized away inside the implementation — the
/// public contract always speaks `id`.
#[async_trait]
pub trait AppStore: Send + Sync {
    /// Returns every record in the backend's natural enumeration order.
    async fn list_apps(&self) -> CatalogResult<Vec<AppRecord>>;

    /// Looks up a single record; `NotFound` if no record matches.
    async fn get_app(&self, id: &str) -> CatalogResult<AppRecord>;

    /// Persists a new record; `InvalidInput` on missing required fields,
    /// `Conflict` if the id is already taken. The record is durable before
    /// the call returns.
    async fn create_app(&self, record: AppRecord) -> CatalogResult<AppRecord>;

    /// Applies a field-level merge to an existing record.
    async fn update_app(&self, id: &str, patch: AppPatch) -> CatalogResult<()>;

    /// Removes a record; `NotFound` if it does not exist.
    async fn delete_app(&self, id: &str) -> CatalogResult<()>;

    /// Returns the record's Compose URL, stored or derived from its name.
    async fn resolve_compose_url(&self, id: &str) -> CatalogResult<String>;
}

pub type SharedStore = Arc<dyn AppStore>;
