//! Interactive mode for the server.
//!
//! Prompts for the dataset, bind address, and port before starting the
//! server.

use std::sync::Arc;

use dialoguer::{Confirm, Input, Select};
use road_safety_hotspot::PrepareOptions;
use road_safety_hotspot::cache::HotspotCache;
use road_safety_source::registry::{DatasetSelection, all_datasets};

use crate::{ServerConfig, run_server};

/// Runs the server in interactive mode, prompting for configuration.
///
/// The dataset prompt starts on the dataset named by `selection`, and the
/// chosen dataset gets the selection's table location overrides. Defaults
/// for the bind prompts come from [`ServerConfig::from_env`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if a prompt fails, the hotspot
/// table cannot be loaded, or the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(selection: DatasetSelection, options: PrepareOptions) -> std::io::Result<()> {
    println!("Road Safety Hotspot Server");
    println!();

    let mut datasets = all_datasets();
    let labels: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} ({})", d.name, d.id))
        .collect();
    let default_idx = selection.index_in(&datasets);

    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&labels)
        .default(default_idx)
        .interact()
        .map_err(std::io::Error::other)?;

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let definition = selection.apply(datasets.swap_remove(idx));
    let cache = Arc::new(HotspotCache::new(definition, options));

    run_server(cache, ServerConfig { bind_addr, port }).await
}
