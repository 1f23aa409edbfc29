use std::fmt;

/// Unified error type for the dockhand crate.
///
/// Backend-specific failures (file I/O, SQLite, HTTP probe) are translated
/// into this taxonomy at the store boundary; nothing above the store ever
/// inspects a backend-native error shape.
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// Caller-supplied data failed a required-field check.
    InvalidInput(String),
    /// An app with the same id already exists.
    Conflict(String),
    /// No record or resource matched the request.
    NotFound(String),
    /// The backing medium could not be read, written, or queried.
    StoreUnavailable(String),
    /// The external Compose resource could not be confirmed to exist.
    ComposeUnavailable(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CatalogError::Conflict(msg) => write!(f, "conflict: {msg}"),
            CatalogError::NotFound(msg) => write!(f, "not found: {msg}"),
            CatalogError::StoreUnavailable(msg) => write!(f, "store unavailable: {msg}"),
            CatalogError::ComposeUnavailable(msg) => write!(f, "compose unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Result type alias using [`CatalogError`].
pub type CatalogResult<T> = Result<T, CatalogError>;
