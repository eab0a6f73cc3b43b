#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road accident dataset registry and CSV loading.
//!
//! Datasets are defined in embedded TOML ([`registry`]) and name the
//! locations of an accident table and, for the severity variant, a
//! casualty table. [`load_dataset`] fetches both tables, validates their
//! column sets, and returns typed rows ready for aggregation.

pub mod csv_download;
pub mod dataset_def;
pub mod registry;

use road_safety_accident_models::{AccidentRecord, CasualtyRecord};

use crate::csv_download::load_table;
use crate::dataset_def::{DatasetDefinition, DatasetVariant};

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or row deserialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from a table's header row.
    #[error("Missing required column '{column}' in {table}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
        /// Table the column was expected in.
        table: String,
    },

    /// No dataset with the requested id is registered.
    #[error("Unknown dataset: {id}")]
    UnknownDataset {
        /// The requested id.
        id: String,
    },

    /// A dataset definition is inconsistent.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Typed tables for one dataset, as read from the source.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub variant: DatasetVariant,
    pub accidents: Vec<AccidentRecord>,
    /// Empty for [`DatasetVariant::Basic`].
    pub casualties: Vec<CasualtyRecord>,
}

/// Loads every table a dataset definition names.
///
/// The severity variant additionally requires the `Accident_Index` column
/// in the accident table so the two tables can be joined.
///
/// # Errors
///
/// Returns [`SourceError`] if any table is unreachable, lacks a required
/// column, or contains an unparseable row.
pub async fn load_dataset(definition: &DatasetDefinition) -> Result<RawDataset, SourceError> {
    log::info!("[{}] Loading dataset '{}'", definition.id, definition.name);

    let casualty_location = definition.casualties_location()?;

    let mut accident_columns = AccidentRecord::REQUIRED_COLUMNS.to_vec();
    if casualty_location.is_some() {
        accident_columns.push(AccidentRecord::INDEX_COLUMN);
    }

    let accidents: Vec<AccidentRecord> =
        load_table(&definition.accidents_location(), &accident_columns).await?;

    let casualties: Vec<CasualtyRecord> = match casualty_location {
        Some(location) => load_table(&location, CasualtyRecord::REQUIRED_COLUMNS).await?,
        None => Vec::new(),
    };

    log::info!(
        "[{}] Loaded {} accidents and {} casualties",
        definition.id,
        accidents.len(),
        casualties.len()
    );

    Ok(RawDataset {
        variant: definition.variant,
        accidents,
        casualties,
    })
}
