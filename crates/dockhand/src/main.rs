use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dockhand::compose::{ComposeResolver, HttpProbe};
use dockhand::config::{Backend, Settings};
use dockhand::server::Server;
use dockhand::store::file::FileStore;
use dockhand::store::sqlite::DocumentStore;
use dockhand::SharedStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();

    let probe = match HttpProbe::new(settings.probe_timeout) {
        Ok(probe) => Arc::new(probe),
        Err(error) => {
            tracing::error!("failed to build compose probe: {error}");
            std::process::exit(1);
        }
    };
    let resolver = ComposeResolver::new(settings.compose_base_url.clone(), probe);

    // The sqlite connection is established once here; if it cannot be
    // opened the process exits before serving any request.
    let store: SharedStore = match settings.backend {
        Backend::File => {
            tracing::info!("using file backend at {}", settings.data_path.display());
            Arc::new(FileStore::new(settings.data_path.clone(), resolver))
        }
        Backend::Sqlite => match DocumentStore::open(&settings.db_path, resolver) {
            Ok(store) => {
                tracing::info!("using sqlite backend at {}", settings.db_path.display());
                Arc::new(store)
            }
            Err(error) => {
                tracing::error!("failed to open database: {error}");
                std::process::exit(1);
            }
        },
    };

    let bind = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let mut server = match Server::new(bind, store).await {
        Ok(server) => server,
        Err(error) => {
            tracing::error!("failed to start server: {error}");
            std::process::exit(1);
        }
    };
    tracing::info!("catalog listening on http://{}", server.addr());

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {error}");
    }
    tracing::info!("shutting down");
    if let Err(error) = server.shutdown() {
        tracing::warn!("{error}");
    }
}
