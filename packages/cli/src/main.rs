#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the road safety hotspot toolchain.
//!
//! Lists datasets, summarizes a loaded hotspot table, prints filtered
//! hotspot views, and starts the API server. Without a subcommand it
//! falls back to an interactive menu.

mod interactive;
mod report;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use road_safety_hotspot::aggregate::WeatherAggregation;
use road_safety_hotspot::cache::HotspotCache;
use road_safety_hotspot::view::build_view;
use road_safety_hotspot::{HotspotTable, PrepareOptions};
use road_safety_server::{ServerConfig, resolve_query};
use road_safety_server_models::{ApiHotspotView, HotspotQueryParams, ViewMode};
use road_safety_source::dataset_def::DatasetDefinition;
use road_safety_source::registry::{DatasetSelection, all_datasets};

#[derive(Parser)]
#[command(name = "road_safety_cli", about = "Road accident hotspot toolchain")]
struct Cli {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Dataset selection shared by every subcommand.
#[derive(Args)]
struct DatasetArgs {
    /// Dataset id (overrides `ROAD_SAFETY_DATASET`)
    #[arg(long, global = true)]
    dataset: Option<String>,
    /// URL or path of the accidents table (overrides `ROAD_SAFETY_ACCIDENTS`)
    #[arg(long, global = true)]
    accidents: Option<String>,
    /// URL or path of the casualties table (overrides `ROAD_SAFETY_CASUALTIES`)
    #[arg(long, global = true)]
    casualties: Option<String>,
    /// How each hotspot's weather codes are reduced to one code
    #[arg(long, global = true, value_enum, default_value_t = WeatherStrategy::TruncatedMean)]
    weather_aggregation: WeatherStrategy,
}

impl DatasetArgs {
    /// The flags as a dataset selection, before any environment fallback.
    fn selection(&self) -> DatasetSelection {
        DatasetSelection {
            id: self.dataset.clone(),
            accidents: self.accidents.clone(),
            casualties: self.casualties.clone(),
        }
    }

    fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            weather: self.weather_aggregation.into(),
            ..PrepareOptions::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WeatherStrategy {
    TruncatedMean,
    Majority,
}

impl From<WeatherStrategy> for WeatherAggregation {
    fn from(strategy: WeatherStrategy) -> Self {
        match strategy {
            WeatherStrategy::TruncatedMean => Self::TruncatedMean,
            WeatherStrategy::Majority => Self::Majority,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered datasets
    Datasets,
    /// Load a dataset and print hotspot counts by hour and weather
    Summary,
    /// Print the hotspots matching an hour or a weather condition
    Hotspots {
        /// Hour of day, 0-23 (default 12)
        #[arg(long, conflicts_with = "weather")]
        hour: Option<u8>,
        /// Weather code, name (e.g. `FOG_OR_MIST`), or label
        #[arg(long)]
        weather: Option<String>,
        /// Marker size ceiling, 10-40 (default 20)
        #[arg(long)]
        size: Option<f64>,
        /// Print the view as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start the API server
    Serve {
        /// Bind address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let selection = cli.dataset.selection().with_env_fallback();
    let options = cli.dataset.prepare_options();

    let Some(command) = cli.command else {
        return interactive::run(selection, options).await;
    };

    let definition = selection.resolve()?;

    match command {
        Commands::Datasets => {
            for line in report::dataset_lines(&all_datasets()) {
                println!("{line}");
            }
        }
        Commands::Summary => {
            let table = load_table(&definition, &options).await?;
            for line in report::summary_lines(&definition, &table) {
                println!("{line}");
            }
        }
        Commands::Hotspots {
            hour,
            weather,
            size,
            json,
        } => {
            let params = HotspotQueryParams {
                mode: Some(if weather.is_some() {
                    ViewMode::Weather
                } else {
                    ViewMode::Hour
                }),
                hour,
                weather,
                size,
            };
            let (filter, size) = resolve_query(&params)?;
            let table = load_table(&definition, &options).await?;
            let view = build_view(&table, filter, size)?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ApiHotspotView::from(view))?
                );
            } else {
                for line in report::view_lines(&view) {
                    println!("{line}");
                }
            }
        }
        Commands::Serve { bind, port } => {
            let defaults = ServerConfig::from_env();
            let config = ServerConfig {
                bind_addr: bind.unwrap_or(defaults.bind_addr),
                port: port.unwrap_or(defaults.port),
            };
            serve(definition, options, config).await?;
        }
    }

    Ok(())
}

async fn load_table(
    definition: &DatasetDefinition,
    options: &PrepareOptions,
) -> Result<HotspotTable, road_safety_hotspot::HotspotError> {
    log::info!("Loading dataset '{}'...", definition.id);
    road_safety_hotspot::load(definition, options).await
}

/// Starts the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve(
    definition: DatasetDefinition,
    options: PrepareOptions,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = Arc::new(HotspotCache::new(definition, options));
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(road_safety_server::run_server(cache, config))
    })
    .await??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_flags_apply_without_a_subcommand() {
        let cli = Cli::try_parse_from([
            "road_safety_cli",
            "--dataset",
            "accidents_2016_severity",
            "--accidents",
            "/local/accidents.csv",
            "--weather-aggregation",
            "majority",
        ])
        .unwrap();
        assert!(cli.command.is_none());

        let definition = cli.dataset.selection().resolve().unwrap();
        assert_eq!(definition.id, "accidents_2016_severity");
        assert_eq!(definition.accidents, "/local/accidents.csv");
        assert_eq!(
            cli.dataset.prepare_options().weather,
            WeatherAggregation::Majority
        );
    }

    #[test]
    fn dataset_flags_are_global() {
        let cli = Cli::try_parse_from([
            "road_safety_cli",
            "summary",
            "--casualties",
            "/local/cas.csv.gz",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Summary)));
        assert_eq!(
            cli.dataset.selection().casualties.as_deref(),
            Some("/local/cas.csv.gz")
        );
        assert_eq!(
            cli.dataset.prepare_options().weather,
            WeatherAggregation::TruncatedMean
        );
    }
}
