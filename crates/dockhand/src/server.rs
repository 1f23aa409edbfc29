use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::store::SharedStore;

pub mod apps;
pub mod error;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    pub async fn new(bind: SocketAddr, store: SharedStore) -> Result<Self, String> {
        let state = Arc::new(ServerState { store });
        let app = router(state);
        let listener = TcpListener::bind(bind)
            .await
            .map_err(|error| format!("failed to bind {bind}: {error}"))?;
        let addr = listener
            .local_addr()
            .map_err(|error| error.to_string())?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> Result<(), String> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| "failed to send server shutdown signal".to_string())
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn router(state: Arc<ServerState>) -> Router {
    // Permissive cross-origin policy: any origin may call the catalog.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    Router::new()
        .route("/health", get(health))
        .route("/apps", get(apps::list).post(apps::create))
        .route(
            "/apps/:id",
            get(apps::get).put(apps::update).delete(apps::delete),
        )
        .route("/apps/:id/compose", get(apps::compose))
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) store: SharedStore,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ComposeProbe, ComposeResolver};
    use crate::error::{CatalogError, CatalogResult};
    use crate::store::file::FileStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    struct NothingHosted;

    #[async_trait]
    impl ComposeProbe for NothingHosted {
        async fn confirm(&self, url: &str) -> CatalogResult<()> {
            Err(CatalogError::ComposeUnavailable(format!(
                "no compose file at {url}"
            )))
        }
    }

    async fn start_server(dir: &std::path::Path) -> Server {
        let resolver =
            ComposeResolver::new("https://example.com/apps", Arc::new(NothingHosted));
        let store = Arc::new(FileStore::new(dir.join("apps.json"), resolver));
        Server::new("127.0.0.1:0".parse().expect("addr"), store)
            .await
            .expect("start")
    }

    #[tokio::test]
    async fn crud_scenario_over_http() {
        let dir = tempdir().expect("tempdir");
        let server = start_server(dir.path()).await;
        let base = format!("http://{}", server.addr());
        let client = reqwest::Client::new();

        // Create.
        let response = client
            .post(format!("{base}/apps"))
            .json(&json!({ "id": "plex", "name": "Plex", "description": "Media server" }))
            .send()
            .await
            .expect("post");
        assert_eq!(response.status(), 201);
        let created: Value = response.json().await.expect("json");
        assert_eq!(created["id"], "plex");
        assert_eq!(created["name"], "Plex");
        assert_eq!(created["description"], "Media server");

        // Read back.
        let response = client
            .get(format!("{base}/apps/plex"))
            .send()
            .await
            .expect("get");
        assert_eq!(response.status(), 200);
        let fetched: Value = response.json().await.expect("json");
        assert_eq!(fetched["name"], "Plex");

        // List.
        let response = client.get(format!("{base}/apps")).send().await.expect("get");
        assert_eq!(response.status(), 200);
        let apps: Vec<Value> = response.json().await.expect("json");
        assert_eq!(apps.len(), 1);

        // Partial update.
        let response = client
            .put(format!("{base}/apps/plex"))
            .json(&json!({ "description": "Streaming media server" }))
            .send()
            .await
            .expect("put");
        assert_eq!(response.status(), 200);
        let response = client
            .get(format!("{base}/apps/plex"))
            .send()
            .await
            .expect("get");
        let updated: Value = response.json().await.expect("json");
        assert_eq!(updated["description"], "Streaming media server");
        assert_eq!(updated["name"], "Plex");

        // Delete.
        let response = client
            .delete(format!("{base}/apps/plex"))
            .send()
            .await
            .expect("delete");
        assert_eq!(response.status(), 200);
        let response = client
            .get(format!("{base}/apps/plex"))
            .send()
            .await
            .expect("get");
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn unknown_app_returns_structured_404() {
        let dir = tempdir().expect("tempdir");
        let server = start_server(dir.path()).await;
        let base = format!("http://{}", server.addr());

        let response = reqwest::get(format!("{base}/apps/unknown"))
            .await
            .expect("get");
        assert_eq!(response.status(), 404);
        let body: Value = response.json().await.expect("json");
        assert_eq!(body["error"], "App not found");
    }

    #[tokio::test]
    async fn missing_description_returns_400() {
        let dir = tempdir().expect("tempdir");
        let server = start_server(dir.path()).await;
        let base = format!("http://{}", server.addr());

        let response = reqwest::Client::new()
            .post(format!("{base}/apps"))
            .json(&json!({ "id": "plex", "name": "Plex" }))
            .send()
            .await
            .expect("post");
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.expect("json");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn duplicate_create_returns_409() {
        let dir = tempdir().expect("tempdir");
        let server = start_server(dir.path()).await;
        let base = format!("http://{}", server.addr());
        let client = reqwest::Client::new();
        let payload = json!({ "id": "plex", "name": "Plex", "description": "Media server" });

        let first = client
            .post(format!("{base}/apps"))
            .json(&payload)
            .send()
            .await
            .expect("post");
        assert_eq!(first.status(), 201);
        let second = client
            .post(format!("{base}/apps"))
            .json(&payload)
            .send()
            .await
            .expect("post");
        assert_eq!(second.status(), 409);
    }

    #[tokio::test]
    async fn compose_without_artifact_returns_404() {
        let dir = tempdir().expect("tempdir");
        let server = start_server(dir.path()).await;
        let base = format!("http://{}", server.addr());
        let client = reqwest::Client::new();

        client
            .post(format!("{base}/apps"))
            .json(&json!({ "id": "plex", "name": "Plex", "description": "Media server" }))
            .send()
            .await
            .expect("post");
        let response = client
            .get(format!("{base}/apps/plex/compose"))
            .send()
            .await
            .expect("get");
        assert_eq!(response.status(), 404);
        let body: Value = response.json().await.expect("json");
        assert_eq!(body["error"], "Compose file not found");
        assert!(body["details"].is_string());
    }
}
