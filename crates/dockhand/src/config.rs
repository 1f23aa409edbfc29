//! Environment-driven settings for the catalog binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::compose::{DEFAULT_COMPOSE_BASE_URL, DEFAULT_PROBE_TIMEOUT_SECS};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_PATH: &str = "data/apps.json";
const DEFAULT_DB_PATH: &str = "data/apps.db";

/// Which persistence backend serves the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    File,
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub backend: Backend,
    pub data_path: PathBuf,
    pub db_path: PathBuf,
    pub compose_base_url: String,
    pub probe_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let port = env::var("DOCKHAND_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let backend = match env::var("DOCKHAND_BACKEND").ok().as_deref() {
            Some("sqlite") => Backend::Sqlite,
            Some("file") | None => Backend::File,
            Some(other) => {
                tracing::warn!("unknown DOCKHAND_BACKEND {other:?}, falling back to file");
                Backend::File
            }
        };
        let data_path = env::var("DOCKHAND_DATA_PATH")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let db_path = env::var("DOCKHAND_DB_PATH")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let compose_base_url = env::var("DOCKHAND_COMPOSE_BASE_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPOSE_BASE_URL.to_string());
        let probe_timeout = env::var("DOCKHAND_COMPOSE_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS);

        Self {
            port,
            backend,
            data_path: PathBuf::from(data_path),
            db_path: PathBuf::from(db_path),
            compose_base_url,
            probe_timeout: Duration::from_secs(probe_timeout),
        }
    }
}
