#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the road safety hotspot map.
//!
//! Loads the hotspot table once at startup and serves filtered,
//! re-scaled, projected views of it as JSON to a map front end. Tile
//! serving and page rendering are left to that front end.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use road_safety_hotspot::cache::HotspotCache;

pub use handlers::{QueryError, resolve_query};

/// Shared application state.
pub struct AppState {
    /// Process-lifetime hotspot table.
    pub cache: Arc<HotspotCache>,
}

/// Bind address and port for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self { bind_addr, port }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route(
                "/weather-conditions",
                web::get().to(handlers::weather_conditions),
            )
            .route("/severities", web::get().to(handlers::severities))
            .route("/hotspots", web::get().to(handlers::hotspots)),
    );
}

/// Loads the hotspot table and starts the API server.
///
/// The table is loaded before the server binds; a load failure aborts
/// startup. This is a regular async function; the caller is responsible
/// for providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the table fails to load, the
/// HTTP server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(cache: Arc<HotspotCache>, config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Loading hotspot table for dataset '{}'...",
        cache.definition().id
    );
    let table = cache.get().await.map_err(std::io::Error::other)?;
    log::info!("Hotspot table ready: {} hotspots", table.len());

    let state = web::Data::new(AppState { cache });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
