//! Document-store variant backed by SQLite.
//!
//! Records live in one table of JSON documents keyed by `_id`. The `_id`
//! column is the backend-native identifier; it is stripped out of the
//! stored document and re-inserted as the public `id` on every read, so no
//! API payload ever carries a `_id` field.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::app::{apply_patch, validate_new, AppPatch, AppRecord};
use crate::compose::ComposeResolver;
use crate::error::{CatalogError, CatalogResult};
use crate::store::AppStore;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS apps (
    _id TEXT PRIMARY KEY,
    doc TEXT NOT NULL
)";

pub struct DocumentStore {
    conn: Mutex<Connection>,
    resolver: ComposeResolver,
}

impl DocumentStore {
    /// Opens (or creates) a store at the given path.
    ///
    /// The connection is established once here and reused for every
    /// request; callers must not begin serving if this fails.
    pub fn open(path: &Path, resolver: ComposeResolver) -> CatalogResult<Self> {
        let conn = Connection::open(path).map_err(|error| {
            CatalogError::StoreUnavailable(format!(
                "failed to open database {}: {error}",
                path.display()
            ))
        })?;
        Self::initialize(conn, resolver)
    }

    /// In-memory store, for tests.
    pub fn in_memory(resolver: ComposeResolver) -> CatalogResult<Self> {
        let conn = Connection::open_in_memory().map_err(|error| {
            CatalogError::StoreUnavailable(format!("failed to open in-memory database: {error}"))
        })?;
        Self::initialize(conn, resolver)
    }

    fn initialize(conn: Connection, resolver: ComposeResolver) -> CatalogResult<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|error| CatalogError::StoreUnavailable(format!("schema setup failed: {error}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
            resolver,
        })
    }

    /// Splits a record into its backend-native shape: the `_id` key and the
    /// document body with the public `id` stripped.
    fn to_row(record: &AppRecord) -> CatalogResult<(String, String)> {
        let mut value = serde_json::to_value(record).map_err(|error| {
            CatalogError::StoreUnavailable(format!("failed to serialize record: {error}"))
        })?;
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
        }
        let doc = serde_json::to_string(&value).map_err(|error| {
            CatalogError::StoreUnavailable(format!("failed to serialize record: {error}"))
        })?;
        Ok((record.id.clone(), doc))
    }

    /// Rehydrates a row into a public record, mapping `_id` back to `id`.
    fn from_row(id: String, doc: &str) -> CatalogResult<AppRecord> {
        let mut value: serde_json::Value = serde_json::from_str(doc).map_err(|error| {
            CatalogError::StoreUnavailable(format!("corrupt document for {id}: {error}"))
        })?;
        match value.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), serde_json::Value::String(id.clone()));
            }
            None => {
                return Err(CatalogError::StoreUnavailable(format!(
                    "corrupt document for {id}: not an object"
                )))
            }
        }
        serde_json::from_value(value).map_err(|error| {
            CatalogError::StoreUnavailable(format!("corrupt document for {id}: {error}"))
        })
    }

    fn fetch(&self, id: &str) -> CatalogResult<Option<AppRecord>> {
        let conn = self.conn.lock().expect("document store mutex poisoned");
        let row = conn
            .query_row(
                "SELECT doc FROM apps WHERE _id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|error| CatalogError::StoreUnavailable(format!("query failed: {error}")))?;
        drop(conn);
        row.map(|doc| Self::from_row(id.to_string(), &doc)).transpose()
    }

    fn put(&self, record: &AppRecord) -> CatalogResult<()> {
        let (id, doc) = Self::to_row(record)?;
        let conn = self.conn.lock().expect("document store mutex poisoned");
        conn.execute(
            "INSERT INTO apps (_id, doc) VALUES (?1, ?2)
             ON CONFLICT(_id) DO UPDATE SET doc = excluded.doc",
            params![id, doc],
        )
        .map_err(|error| CatalogError::StoreUnavailable(format!("write failed: {error}")))?;
        Ok(())
    }
}

#[async_trait]
impl AppStore for DocumentStore {
    async fn list_apps(&self) -> CatalogResult<Vec<AppRecord>> {
        let rows = {
            let conn = self.conn.lock().expect("document store mutex poisoned");
            let mut statement = conn
                .prepare("SELECT _id, doc FROM apps ORDER BY rowid")
                .map_err(|error| {
                    CatalogError::StoreUnavailable(format!("query failed: {error}"))
                })?;
            let rows = statement
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|error| {
                    CatalogError::StoreUnavailable(format!("query failed: {error}"))
                })?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| {
                    CatalogError::StoreUnavailable(format!("query failed: {error}"))
                })?;
            rows
        };
        rows.into_iter()
            .map(|(id, doc)| Self::from_row(id, &doc))
            .collect()
    }

    async fn get_app(&self, id: &str) -> CatalogResult<AppRecord> {
        self.fetch(id)?
            .ok_or_else(|| CatalogError::NotFound("App not found".to_string()))
    }

    async fn create_app(&self, record: AppRecord) -> CatalogResult<AppRecord> {
        validate_new(&record)?;
        // Explicit existence check: the Conflict error shape must not depend
        // on a uniqueness constraint being configured at the storage layer.
        if self.fetch(&record.id)?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "app with id {} already exists",
                record.id
            )));
        }
        self.put(&record)?;
        Ok(record)
    }

    async fn update_app(&self, id: &str, patch: AppPatch) -> CatalogResult<()> {
        let current = self
            .fetch(id)?
            .ok_or_else(|| CatalogError::NotFound("App not found".to_string()))?;
        let merged = apply_patch(&current, &patch)?;
        self.put(&merged)
    }

    async fn delete_app(&self, id: &str) -> CatalogResult<()> {
        let conn = self.conn.lock().expect("document store mutex poisoned");
        let deleted = conn
            .execute("DELETE FROM apps WHERE _id = ?1", params![id])
            .map_err(|error| CatalogError::StoreUnavailable(format!("delete failed: {error}")))?;
        if deleted == 0 {
            return Err(CatalogError::NotFound("App not found".to_string()));
        }
        Ok(())
    }

    async fn resolve_compose_url(&self, id: &str) -> CatalogResult<String> {
        let record = self.get_app(id).await?;
        self.resolver.resolve(&record).await
    }
}
