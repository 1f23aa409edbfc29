//! Compose-file resolution.
//!
//! An app either carries a stored `composeUrl` or gets one derived from its
//! name via a fixed template. Derived URLs are only returned after a
//! lightweight existence check against the remote host, so callers never
//! receive a pointer to a Compose file that is not actually there.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::AppRecord;
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_COMPOSE_BASE_URL: &str =
    "https://raw.githubusercontent.com/docksnappy/apps/main";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Existence check for a remote Compose resource.
///
/// Kept behind a trait so stores can be constructed with a test double
/// instead of a live HTTP client.
#[async_trait]
pub trait ComposeProbe: Send + Sync {
    /// Confirms that a Compose file exists at `url`.
    ///
    /// Any non-success response, network failure, or timeout is
    /// `ComposeUnavailable`.
    async fn confirm(&self, url: &str) -> CatalogResult<()>;
}

/// Production probe: a `HEAD` request with a bounded timeout.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                CatalogError::ComposeUnavailable(format!("failed to build http client: {error}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ComposeProbe for HttpProbe {
    async fn confirm(&self, url: &str) -> CatalogResult<()> {
        let response = self.client.head(url).send().await.map_err(|error| {
            CatalogError::ComposeUnavailable(format!("compose check failed for {url}: {error}"))
        })?;
        if !response.status().is_success() {
            return Err(CatalogError::ComposeUnavailable(format!(
                "no compose file at {url} (status {})",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Derives and confirms Compose URLs for app records.
#[derive(Clone)]
pub struct ComposeResolver {
    base_url: String,
    probe: Arc<dyn ComposeProbe>,
}

impl ComposeResolver {
    pub fn new(base_url: impl Into<String>, probe: Arc<dyn ComposeProbe>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, probe }
    }

    /// The template URL for an app name.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}/docker-compose.yml", self.base_url, name)
    }

    /// Resolves the Compose URL for a record.
    ///
    /// A stored `composeUrl` is returned as-is without probing; only derived
    /// URLs are confirmed against the remote host.
    pub async fn resolve(&self, record: &AppRecord) -> CatalogResult<String> {
        if let Some(url) = &record.compose_url {
            return Ok(url.clone());
        }
        let url = self.url_for(&record.name);
        self.probe.confirm(&url).await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProbe {
        calls: AtomicUsize,
        outcome: Option<String>,
    }

    impl StubProbe {
        fn found() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: None,
            }
        }

        fn missing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl ComposeProbe for StubProbe {
        async fn confirm(&self, _url: &str) -> CatalogResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                None => Ok(()),
                Some(message) => Err(CatalogError::ComposeUnavailable(message.clone())),
            }
        }
    }

    fn record(compose_url: Option<&str>) -> AppRecord {
        AppRecord {
            id: "plex".to_string(),
            name: "Plex".to_string(),
            description: "Media server".to_string(),
            compose_url: compose_url.map(String::from),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn stored_url_skips_the_probe() {
        let probe = Arc::new(StubProbe::found());
        let resolver = ComposeResolver::new("https://example.com/apps", probe.clone());
        let url = resolver
            .resolve(&record(Some("https://example.com/custom.yml")))
            .await
            .expect("resolve");
        assert_eq!(url, "https://example.com/custom.yml");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn derived_url_follows_the_template() {
        let probe = Arc::new(StubProbe::found());
        let resolver = ComposeResolver::new("https://example.com/apps/", probe.clone());
        let url = resolver.resolve(&record(None)).await.expect("resolve");
        assert_eq!(url, "https://example.com/apps/Plex/docker-compose.yml");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_resource_is_compose_unavailable() {
        let probe = Arc::new(StubProbe::missing("no compose file"));
        let resolver = ComposeResolver::new("https://example.com/apps", probe);
        match resolver.resolve(&record(None)).await {
            Err(CatalogError::ComposeUnavailable(_)) => {}
            other => panic!("expected compose unavailable, got {other:?}"),
        }
    }
}
