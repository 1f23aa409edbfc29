use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::CatalogError;

/// Standardised API error response body.
///
/// Every error returned by the HTTP layer serialises as:
/// ```json
/// { "error": "<message>", "details": "<underlying failure, when available>" }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            CatalogError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            CatalogError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            CatalogError::StoreUnavailable(msg) => {
                tracing::error!("store unavailable: {msg}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to access apps data")
                    .with_details(msg)
            }
            CatalogError::ComposeUnavailable(msg) => {
                Self::new(StatusCode::NOT_FOUND, "Compose file not found").with_details(msg)
            }
        }
    }
}
