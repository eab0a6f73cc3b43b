#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the road safety hotspot API.
//!
//! Configured entirely from the environment: `ROAD_SAFETY_DATASET`,
//! `ROAD_SAFETY_ACCIDENTS`, `ROAD_SAFETY_CASUALTIES`, `BIND_ADDR`, `PORT`
//! and `RUST_LOG`.

use std::sync::Arc;

use road_safety_hotspot::PrepareOptions;
use road_safety_hotspot::cache::HotspotCache;
use road_safety_server::{ServerConfig, run_server};
use road_safety_source::registry::selected_dataset;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let definition = selected_dataset(None, None, None).map_err(std::io::Error::other)?;
    let cache = Arc::new(HotspotCache::new(definition, PrepareOptions::default()));

    run_server(cache, ServerConfig::from_env()).await
}
