//! Interactive menu shown when no subcommand is given.

use dialoguer::{Input, Select};
use road_safety_accident_models::WeatherCondition;
use road_safety_hotspot::PrepareOptions;
use road_safety_hotspot::scale::DEFAULT_SIZE;
use road_safety_hotspot::view::{DEFAULT_HOUR, HotspotFilter, build_view};
use road_safety_source::registry::{DatasetSelection, all_datasets};

use crate::report;

/// Top-level actions.
enum Action {
    ListDatasets,
    Summary,
    HotspotsByHour,
    HotspotsByWeather,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ListDatasets,
        Self::Summary,
        Self::HotspotsByHour,
        Self::HotspotsByWeather,
        Self::Serve,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ListDatasets => "List datasets",
            Self::Summary => "Summarize a dataset",
            Self::HotspotsByHour => "Show hotspots by hour",
            Self::HotspotsByWeather => "Show hotspots by weather",
            Self::Serve => "Start server",
        }
    }
}

/// Runs the interactive menu.
///
/// `selection` preselects the dataset prompt and supplies table location
/// overrides for whichever dataset is chosen; `options` drives the load.
///
/// # Errors
///
/// Returns an error if a prompt fails, the dataset cannot be loaded, or
/// the server fails.
pub async fn run(
    selection: DatasetSelection,
    options: PrepareOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Road Safety Hotspots");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let action = &Action::ALL[idx];

    match action {
        Action::ListDatasets => {
            for line in report::dataset_lines(&all_datasets()) {
                println!("{line}");
            }
            return Ok(());
        }
        Action::Serve => {
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new()
                    .block_on(road_safety_server::interactive::run(selection, options))
            })
            .await??;
            return Ok(());
        }
        Action::Summary | Action::HotspotsByHour | Action::HotspotsByWeather => {}
    }

    let mut datasets = all_datasets();
    let dataset_labels: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} ({})", d.name, d.id))
        .collect();
    let default_idx = selection.index_in(&datasets);
    let dataset_idx = Select::new()
        .with_prompt("Dataset")
        .items(&dataset_labels)
        .default(default_idx)
        .interact()?;
    let definition = selection.apply(datasets.swap_remove(dataset_idx));

    let filter = match action {
        Action::HotspotsByHour => {
            let hour: u8 = Input::new()
                .with_prompt("Hour (0-23)")
                .default(DEFAULT_HOUR)
                .validate_with(|h: &u8| {
                    if *h <= 23 {
                        Ok(())
                    } else {
                        Err("hour must be 0-23")
                    }
                })
                .interact_text()?;
            Some(HotspotFilter::hour(hour)?)
        }
        Action::HotspotsByWeather => {
            let conditions = WeatherCondition::all();
            let weather_labels: Vec<&str> = conditions.iter().map(|c| c.label()).collect();
            let weather_idx = Select::new()
                .with_prompt("Weather condition")
                .items(&weather_labels)
                .default(0)
                .interact()?;
            Some(HotspotFilter::Weather(conditions[weather_idx]))
        }
        _ => None,
    };

    let table = road_safety_hotspot::load(&definition, &options).await?;

    let lines = match filter {
        Some(filter) => report::view_lines(&build_view(&table, filter, DEFAULT_SIZE)?),
        None => report::summary_lines(&definition, &table),
    };
    for line in lines {
        println!("{line}");
    }

    Ok(())
}
