#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident, casualty severity, weather, and hotspot types.
//!
//! This crate defines the record types shared across the road-safety
//! workspace: the raw rows read from the accident and casualty tables,
//! the categorical code tables (weather and severity), and the aggregated
//! [`Hotspot`] rows produced by the preparation pipeline.
//!
//! Serialized field names match the column names of the source tables
//! (`Longitude`, `Number_of_Casualties`, ...) so that downstream plotting
//! layers can address columns by their familiar names.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Injury outcome of a casualty, coded 1 (worst) to 3 in the source data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CasualtySeverity {
    /// Code 1
    Fatal = 1,
    /// Code 2
    Serious = 2,
    /// Code 3
    Slight = 3,
}

impl CasualtySeverity {
    /// Returns the numeric code of this severity.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity from its numeric code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not in the range 1-3.
    pub const fn from_value(value: i64) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Fatal),
            2 => Ok(Self::Serious),
            3 => Ok(Self::Slight),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Marker color used when plotting points of this severity.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Slight => "red",
            Self::Serious => "blue",
            Self::Fatal => "green",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fatal, Self::Serious, Self::Slight]
    }
}

/// Error returned when attempting to create a [`CasualtySeverity`] from an
/// invalid numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity code that was provided.
    pub value: i64,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid casualty severity {}: expected 1-3", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Weather at the time of an accident, coded 1-9 in the source data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum WeatherCondition {
    FineNoHighWinds = 1,
    RainingNoHighWinds = 2,
    SnowingNoHighWinds = 3,
    FineHighWinds = 4,
    RainingHighWinds = 5,
    SnowingHighWinds = 6,
    FogOrMist = 7,
    Other = 8,
    Unknown = 9,
}

impl WeatherCondition {
    /// Returns the numeric code of this condition.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Creates a condition from its numeric code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not in the range 1-9.
    pub const fn from_code(code: i64) -> Result<Self, InvalidWeatherError> {
        match code {
            1 => Ok(Self::FineNoHighWinds),
            2 => Ok(Self::RainingNoHighWinds),
            3 => Ok(Self::SnowingNoHighWinds),
            4 => Ok(Self::FineHighWinds),
            5 => Ok(Self::RainingHighWinds),
            6 => Ok(Self::SnowingHighWinds),
            7 => Ok(Self::FogOrMist),
            8 => Ok(Self::Other),
            9 => Ok(Self::Unknown),
            _ => Err(InvalidWeatherError {
                input: String::new(),
                code: Some(code),
            }),
        }
    }

    /// Human-readable label as shown in the weather selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FineNoHighWinds => "Fine no high winds",
            Self::RainingNoHighWinds => "Raining no high winds",
            Self::SnowingNoHighWinds => "Snowing no high winds",
            Self::FineHighWinds => "Fine + high winds",
            Self::RainingHighWinds => "Raining + high winds",
            Self::SnowingHighWinds => "Snowing + high winds",
            Self::FogOrMist => "Fog or mist",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }

    /// Resolves a user-supplied weather selection.
    ///
    /// Accepts the numeric code (`"2"`), the enum name
    /// (`"RAINING_NO_HIGH_WINDS"`, case-insensitive), or the selector label
    /// (`"Raining no high winds"`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the input matches none of the three forms.
    pub fn lookup(input: &str) -> Result<Self, InvalidWeatherError> {
        let trimmed = input.trim();

        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code).map_err(|e| InvalidWeatherError {
                input: trimmed.to_owned(),
                ..e
            });
        }

        if let Ok(condition) = trimmed.parse::<Self>() {
            return Ok(condition);
        }

        Self::all()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidWeatherError {
                input: trimmed.to_owned(),
                code: None,
            })
    }

    /// Returns all variants in selector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::FineNoHighWinds,
            Self::RainingNoHighWinds,
            Self::SnowingNoHighWinds,
            Self::FineHighWinds,
            Self::RainingHighWinds,
            Self::SnowingHighWinds,
            Self::FogOrMist,
            Self::Other,
            Self::Unknown,
        ]
    }
}

/// Error returned when a weather code or label cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidWeatherError {
    /// The raw input, empty when resolving a bare numeric code.
    pub input: String,
    /// The numeric code, if the input was numeric.
    pub code: Option<i64>,
}

impl std::fmt::Display for InvalidWeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "invalid weather code {code}: expected 1-9"),
            None => write!(f, "unknown weather condition '{}'", self.input),
        }
    }
}

impl std::error::Error for InvalidWeatherError {}

/// One row of the accident table, restricted to the columns the pipeline
/// reads.
///
/// Coordinate and date/time fields are optional because the published
/// tables contain blank cells for a small number of accidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    /// Join key into the casualty table. Only read by the severity variant.
    #[serde(rename = "Accident_Index", default)]
    pub accident_index: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    /// Calendar date, e.g. `01/11/2016`.
    #[serde(rename = "Date")]
    pub date: Option<String>,
    /// Clock time without seconds, e.g. `17:42`.
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "Number_of_Casualties")]
    pub number_of_casualties: u32,
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: i32,
}

impl AccidentRecord {
    /// Columns every accident table must provide.
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "Longitude",
        "Latitude",
        "Date",
        "Time",
        "Number_of_Casualties",
        "Weather_Conditions",
    ];

    /// Join key column, required only when a casualty table is joined.
    pub const INDEX_COLUMN: &'static str = "Accident_Index";
}

/// One row of the casualty table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasualtyRecord {
    #[serde(rename = "Accident_Index")]
    pub accident_index: String,
    /// Raw severity code (1 = fatal, 2 = serious, 3 = slight).
    #[serde(rename = "Casualty_Severity")]
    pub casualty_severity: i64,
}

impl CasualtyRecord {
    /// Columns every casualty table must provide.
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &["Accident_Index", "Casualty_Severity"];
}

/// One aggregated (location, time\[, severity\]) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    /// Combined date and time of the bucket. Dropped (`None`) once a
    /// severity label is attached.
    #[serde(rename = "Datetime", skip_serializing_if = "Option::is_none", default)]
    pub occurred_at: Option<NaiveDateTime>,
    /// Mean casualty count across the accidents in the bucket.
    #[serde(rename = "Number_of_Casualties")]
    pub number_of_casualties: f64,
    /// Reduced weather code for the bucket. Not guaranteed to be a valid
    /// [`WeatherCondition`] code; see [`Hotspot::weather`].
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: i32,
    /// Marker size, max-normalized against the table it belongs to.
    pub circle_sizes: f64,
    /// Hour of day, 0-23.
    pub time: u8,
    #[serde(
        rename = "Casualty_Severity",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub casualty_severity: Option<CasualtySeverity>,
}

impl Hotspot {
    /// The bucket's weather as a named condition, if the reduced code is
    /// one of the nine catalogued codes.
    #[must_use]
    pub fn weather(&self) -> Option<WeatherCondition> {
        WeatherCondition::from_code(i64::from(self.weather_conditions)).ok()
    }
}
