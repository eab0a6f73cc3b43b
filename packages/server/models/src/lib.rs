#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the road safety server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the hotspot table types to allow independent evolution of the API
//! contract.
//!
//! API field names are camelCase rather than the table's column names.
//! [`ApiHotspot`] maps them as follows:
//!
//! | Table column           | API field            |
//! |------------------------|----------------------|
//! | `Longitude`            | `longitude`          |
//! | `Latitude`             | `latitude`           |
//! | `LON`                  | `x`                  |
//! | `LAT`                  | `y`                  |
//! | `Number_of_Casualties` | `numberOfCasualties` |
//! | `Weather_Conditions`   | `weatherConditions`  |
//! | `circle_sizes`         | `circleSizes`        |
//! | `time`                 | `time`               |
//! | `Casualty_Severity`    | `casualtySeverity`   |
//!
//! `color` and `tooltip` are derived from the row and have no column.

use road_safety_accident_models::{CasualtySeverity, WeatherCondition};
use road_safety_hotspot::view::{HotspotPoint, HotspotView};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
    /// Number of hotspots in the loaded table.
    pub hotspots: usize,
}

/// One entry of the weather selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWeatherCondition {
    /// Numeric code (1-9).
    pub code: i32,
    /// Enum name, e.g. `FOG_OR_MIST`.
    pub name: WeatherCondition,
    /// Selector label, e.g. `Fog or mist`.
    pub label: String,
}

impl From<WeatherCondition> for ApiWeatherCondition {
    fn from(condition: WeatherCondition) -> Self {
        Self {
            code: condition.code(),
            name: condition,
            label: condition.label().to_owned(),
        }
    }
}

/// One entry of the severity legend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeverity {
    /// Numeric code (1-3).
    pub code: u8,
    pub name: CasualtySeverity,
    /// Marker color.
    pub color: String,
}

impl From<CasualtySeverity> for ApiSeverity {
    fn from(severity: CasualtySeverity) -> Self {
        Self {
            code: severity.value(),
            name: severity,
            color: severity.color().to_owned(),
        }
    }
}

/// Which control drives the hotspot view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// Filter by hour of day.
    #[default]
    Hour,
    /// Filter by weather condition.
    Weather,
}

/// Query parameters for the hotspots endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotQueryParams {
    /// Defaults to [`ViewMode::Hour`].
    pub mode: Option<ViewMode>,
    /// Hour of day (0-23) for [`ViewMode::Hour`]. Defaults to 12.
    pub hour: Option<u8>,
    /// Weather code, enum name, or label for [`ViewMode::Weather`].
    pub weather: Option<String>,
    /// Marker size ceiling (10-40). Defaults to 20.
    pub size: Option<f64>,
}

/// One hover tooltip line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTooltipEntry {
    pub label: String,
    pub value: String,
}

/// A plotted hotspot as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHotspot {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Web-Mercator x in meters.
    pub x: f64,
    /// Web-Mercator y in meters.
    pub y: f64,
    /// Mean casualty count of the bucket.
    pub number_of_casualties: f64,
    /// Reduced weather code of the bucket.
    pub weather_conditions: i32,
    /// Marker size.
    pub circle_sizes: f64,
    /// Hour of day (0-23).
    pub time: u8,
    pub casualty_severity: Option<CasualtySeverity>,
    /// Marker color, set when a severity is present.
    pub color: Option<String>,
    pub tooltip: Vec<ApiTooltipEntry>,
}

impl From<HotspotPoint> for ApiHotspot {
    fn from(point: HotspotPoint) -> Self {
        let color = point.color().map(str::to_owned);
        let tooltip = point
            .tooltip()
            .into_iter()
            .map(|(label, value)| ApiTooltipEntry {
                label: label.to_owned(),
                value,
            })
            .collect();
        let hotspot = point.hotspot;

        Self {
            longitude: hotspot.longitude,
            latitude: hotspot.latitude,
            x: point.x,
            y: point.y,
            number_of_casualties: hotspot.number_of_casualties,
            weather_conditions: hotspot.weather_conditions,
            circle_sizes: hotspot.circle_sizes,
            time: hotspot.time,
            casualty_severity: hotspot.casualty_severity,
            color,
            tooltip,
        }
    }
}

/// A filtered view of the hotspot table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHotspotView {
    /// Title shown above the map.
    pub heading: String,
    /// Marker size ceiling the view was scaled to.
    pub size: f64,
    /// Number of points.
    pub count: usize,
    pub points: Vec<ApiHotspot>,
}

impl From<HotspotView> for ApiHotspotView {
    fn from(view: HotspotView) -> Self {
        Self {
            heading: view.heading,
            size: view.size,
            count: view.points.len(),
            points: view.points.into_iter().map(ApiHotspot::from).collect(),
        }
    }
}
