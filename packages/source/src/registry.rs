//! Dataset registry. Loads all dataset definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a new dataset is as
//! simple as creating a new TOML file and adding it to the list below.

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    (
        "accidents_2016",
        include_str!("../datasets/accidents_2016.toml"),
    ),
    (
        "accidents_2016_severity",
        include_str!("../datasets/accidents_2016_severity.toml"),
    ),
];

/// Dataset used when no id is configured.
pub const DEFAULT_DATASET_ID: &str = "accidents_2016";

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a dataset definition by its id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if no embedded config has the
/// given id.
pub fn dataset_by_id(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| SourceError::UnknownDataset { id: id.to_owned() })
}

/// Which dataset to load and where to read its tables from.
///
/// Every field is optional; unset fields fall back to the
/// `ROAD_SAFETY_DATASET`, `ROAD_SAFETY_ACCIDENTS`, and
/// `ROAD_SAFETY_CASUALTIES` environment variables (see
/// [`Self::with_env_fallback`]), then to [`DEFAULT_DATASET_ID`] and the
/// locations in the embedded definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSelection {
    pub id: Option<String>,
    pub accidents: Option<String>,
    pub casualties: Option<String>,
}

impl DatasetSelection {
    /// Fills unset fields from the process environment.
    #[must_use]
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|key| std::env::var(key).ok())
    }

    /// Fills unset fields from `lookup`, keyed by environment variable
    /// name.
    #[must_use]
    pub fn with_fallback(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            id: self.id.or_else(|| lookup("ROAD_SAFETY_DATASET")),
            accidents: self.accidents.or_else(|| lookup("ROAD_SAFETY_ACCIDENTS")),
            casualties: self.casualties.or_else(|| lookup("ROAD_SAFETY_CASUALTIES")),
        }
    }

    /// The selected id, or [`DEFAULT_DATASET_ID`].
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().map_or(DEFAULT_DATASET_ID, str::trim)
    }

    /// Position of the selected dataset in `datasets`, for preselecting it
    /// in a prompt. Falls back to the first entry.
    #[must_use]
    pub fn index_in(&self, datasets: &[DatasetDefinition]) -> usize {
        datasets.iter().position(|d| d.id == self.id()).unwrap_or(0)
    }

    /// Replaces the table locations of `definition` with any overrides.
    ///
    /// This makes it easy to point a registered dataset at a local copy.
    #[must_use]
    pub fn apply(&self, definition: DatasetDefinition) -> DatasetDefinition {
        definition.with_overrides(self.accidents.clone(), self.casualties.clone())
    }

    /// Looks up the selected dataset and applies the location overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownDataset`] if the selected id is not
    /// registered.
    pub fn resolve(&self) -> Result<DatasetDefinition, SourceError> {
        let id = self.id();
        let definition = dataset_by_id(id).inspect_err(|_| {
            log::warn!(
                "No dataset '{id}'. Available: {}",
                all_datasets()
                    .iter()
                    .map(|d| d.id.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        })?;

        Ok(self.apply(definition))
    }
}

/// Resolves the dataset to load from CLI flags, falling back to the
/// environment and then to [`DEFAULT_DATASET_ID`].
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if the selected id is not
/// registered.
pub fn selected_dataset(
    cli_id: Option<String>,
    cli_accidents: Option<String>,
    cli_casualties: Option<String>,
) -> Result<DatasetDefinition, SourceError> {
    DatasetSelection {
        id: cli_id,
        accidents: cli_accidents,
        casualties: cli_casualties,
    }
    .with_env_fallback()
    .resolve()
}
