//! HTTP surface over the cleaned dataset.
//!
//! Every handler validates its path parameters, then does its database work on
//! the blocking pool with a connection opened for that request.

pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::download::SpeciesSource;

pub struct AppState {
    pub db_path: PathBuf,
    pub species: Arc<dyn SpeciesSource + Send + Sync>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, species: Arc<dyn SpeciesSource + Send + Sync>) -> Self {
        Self {
            db_path: db_path.into(),
            species,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/pokemon/ability/{name}", get(routes::pokemon_by_ability))
        .route("/pokemon/type/{name}", get(routes::pokemon_by_type))
        .route("/trainers/pokemon/{name}", get(routes::trainers_by_pokemon))
        .route("/abilities/pokemon/{name}", get(routes::abilities_by_pokemon))
        .route(
            "/pokemon/{pokemon_name}/trainer/{trainer_name}",
            post(routes::register),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, db = ?state.db_path, "HTTP server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
