//! The catalog entry type and the validation/merge helpers shared by every
//! store backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CatalogError, CatalogResult};

/// One catalog entry: an application plus the pointer to its Compose file.
///
/// `id` is assigned by the caller at creation time and never changes.
/// Arbitrary extra metadata (icon URLs, categories, color hints) is carried
/// through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A partial update: fields present replace the record's fields, fields
/// absent are untouched. Applied via [`apply_patch`].
pub type AppPatch = Map<String, Value>;

/// Checks the required fields of a record about to be created.
pub fn validate_new(record: &AppRecord) -> CatalogResult<()> {
    if record.id.is_empty() {
        return Err(CatalogError::InvalidInput("id must not be empty".to_string()));
    }
    if record.name.is_empty() {
        return Err(CatalogError::InvalidInput(
            "name must not be empty".to_string(),
        ));
    }
    if record.description.is_empty() {
        return Err(CatalogError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks a patch before it is merged into an existing record.
///
/// `name` and `description` may be omitted, but when present must be
/// non-empty strings. `id` is immutable: a patch may repeat the current id
/// but never change it.
pub fn validate_patch(current_id: &str, patch: &AppPatch) -> CatalogResult<()> {
    for field in ["name", "description"] {
        if let Some(value) = patch.get(field) {
            match value.as_str() {
                Some(s) if !s.is_empty() => {}
                Some(_) => {
                    return Err(CatalogError::InvalidInput(format!(
                        "{field} must not be empty"
                    )))
                }
                None => {
                    return Err(CatalogError::InvalidInput(format!(
                        "{field} must be a string"
                    )))
                }
            }
        }
    }
    if let Some(id) = patch.get("id") {
        if id.as_str() != Some(current_id) {
            return Err(CatalogError::InvalidInput("id is immutable".to_string()));
        }
    }
    Ok(())
}

/// Merges a validated patch into a record, field by field.
///
/// Fields named in the patch replace the record's fields (including entries
/// in the pass-through metadata); everything else is left alone. Setting a
/// field to `null` clears it where the schema allows (`composeUrl`).
pub fn apply_patch(record: &AppRecord, patch: &AppPatch) -> CatalogResult<AppRecord> {
    validate_patch(&record.id, patch)?;
    let mut merged = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            return Err(CatalogError::StoreUnavailable(
                "failed to serialize record for merge".to_string(),
            ))
        }
    };
    for (key, value) in patch {
        if value.is_null() && key != "composeUrl" {
            merged.remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(Value::Object(merged))
        .map_err(|error| CatalogError::InvalidInput(format!("invalid patch: {error}")))
}
