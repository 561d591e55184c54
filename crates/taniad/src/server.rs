//! HTTP server for taniad

use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tania_common::catalog_db::CatalogDb;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
///
/// A single SQLite connection behind a Mutex: every operation is one
/// short read, so contention is not a concern at catalog scale.
pub struct AppState {
    pub db: Arc<Mutex<CatalogDb>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: CatalogDb) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            start_time: Instant::now(),
        }
    }
}

/// Assemble the full router (shared with the integration tests).
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::map_routes())
        .merge(routes::pest_routes())
        .merge(routes::catalog_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The map and catalog pages are served from a separate frontend.
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server.
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
