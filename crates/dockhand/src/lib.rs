pub mod server;

pub mod app;
pub mod compose;
pub mod config;
pub mod error;
pub mod store;

pub use crate::app::{AppPatch, AppRecord};
pub use crate::error::{CatalogError, CatalogResult};
pub use crate::store::{AppStore, SharedStore};
