//! Catalog API endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppRecord;
use crate::server::ServerState;
use crate::server::error::ApiError;

/// Response for the compose-URL endpoint.
#[derive(Debug, Serialize)]
pub struct ComposeUrlResponse {
    pub url: String,
}

/// Confirmation response for update and delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /apps
///
/// Lists every app in the catalog.
pub(crate) async fn list(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<AppRecord>>, ApiError> {
    let apps = state.store.list_apps().await?;
    Ok(Json(apps))
}

/// GET /apps/:id
pub(crate) async fn get(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<AppRecord>, ApiError> {
    let app = state.store.get_app(&id).await?;
    Ok(Json(app))
}

/// GET /apps/:id/compose
///
/// Resolves the app's Compose-file URL, stored or derived from its name.
pub(crate) async fn compose(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ComposeUrlResponse>, ApiError> {
    let url = state.store.resolve_compose_url(&id).await?;
    Ok(Json(ComposeUrlResponse { url }))
}

/// POST /apps
///
/// Creates a new app. The body is the full record; `id`, `name` and
/// `description` are required, anything else is carried through untouched.
pub(crate) async fn create(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AppRecord>), ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let record: AppRecord = serde_json::from_value(payload)
        .map_err(|error| ApiError::bad_request(format!("invalid app record: {error}")))?;
    let created = state.store.create_app(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /apps/:id
///
/// Applies a partial update: fields present in the body replace the
/// record's fields, fields absent are untouched.
pub(crate) async fn update(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let patch = match payload {
        Value::Object(map) => map,
        _ => return Err(ApiError::bad_request("request body must be a JSON object")),
    };
    state.store.update_app(&id, patch).await?;
    Ok(Json(MessageResponse {
        message: "App updated".to_string(),
    }))
}

/// DELETE /apps/:id
pub(crate) async fn delete(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_app(&id).await?;
    Ok(Json(MessageResponse {
        message: "App deleted".to_string(),
    }))
}
