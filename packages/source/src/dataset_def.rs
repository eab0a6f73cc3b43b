//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures where a dataset's tables live and which
//! dashboard variant it feeds. Locations are plain strings in TOML and are
//! resolved into a [`DatasetLocation`] when loading.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SourceError;

/// Which flavour of hotspot table a dataset produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetVariant {
    /// Accident table only; buckets keyed by location and time.
    Basic,
    /// Accident table joined with the casualty table; buckets additionally
    /// keyed by casualty severity.
    Severity,
}

/// A complete dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"accidents_2016"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub variant: DatasetVariant,
    /// Location of the accident table.
    pub accidents: String,
    /// Location of the casualty table. Required for
    /// [`DatasetVariant::Severity`].
    #[serde(default)]
    pub casualties: Option<String>,
}

impl DatasetDefinition {
    /// Returns a copy with the table locations replaced by any overrides
    /// that are set.
    #[must_use]
    pub fn with_overrides(mut self, accidents: Option<String>, casualties: Option<String>) -> Self {
        if let Some(accidents) = accidents {
            self.accidents = accidents;
        }
        if casualties.is_some() {
            self.casualties = casualties;
        }
        self
    }

    /// Resolved location of the accident table.
    #[must_use]
    pub fn accidents_location(&self) -> DatasetLocation {
        DatasetLocation::parse(&self.accidents)
    }

    /// Resolved location of the casualty table, if this dataset joins one.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the dataset is a severity variant
    /// without a casualty table.
    pub fn casualties_location(&self) -> Result<Option<DatasetLocation>, SourceError> {
        match (self.variant, &self.casualties) {
            (DatasetVariant::Basic, _) => Ok(None),
            (DatasetVariant::Severity, Some(loc)) => Ok(Some(DatasetLocation::parse(loc))),
            (DatasetVariant::Severity, None) => Err(SourceError::Config {
                message: format!("dataset '{}' has no casualty table configured", self.id),
            }),
        }
    }
}

/// Where a table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    /// Downloaded over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    Path(PathBuf),
}

impl DatasetLocation {
    /// Classifies a location string: `http://` and `https://` prefixes are
    /// URLs, everything else is a filesystem path.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_owned())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }

    /// Whether the table is gzip-compressed, judged by a `.gz` suffix.
    #[must_use]
    pub fn is_gzipped(&self) -> bool {
        match self {
            Self::Url(url) => url.ends_with(".gz"),
            Self::Path(path) => path.extension().is_some_and(|ext| ext == "gz"),
        }
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parses a dataset definition from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, toml::de::Error> {
    toml::from_str(toml_str)
}
