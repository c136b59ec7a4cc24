use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::{
    account::service::AccountService,
    recipe::service::RecipeService,
    storage::{
        blob_store::{BlobStore, FsBlobStore, PublicUrls},
        record_store::RecordStore,
    },
};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| cfg.server.host.clone());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Wire the storage stack and services into an application router.
pub async fn build_app(cfg: &configs::AppConfig) -> anyhow::Result<Router> {
    common::env::ensure_env(&cfg.storage.data_dir).await?;

    let urls = PublicUrls::new(
        cfg.storage.bucket.clone(),
        cfg.storage.region.clone(),
        cfg.storage.public_base_url.clone(),
    );
    let blobs: Arc<dyn BlobStore> = FsBlobStore::new(&cfg.storage.data_dir, urls).await?;
    let record_store = RecordStore::new(Arc::clone(&blobs));

    let state = ServerState {
        accounts: AccountService::new(Arc::clone(&record_store)),
        recipes: RecipeService::new(record_store, blobs),
    };

    Ok(routes::build_router(build_cors(), state))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, "starting recipe server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
