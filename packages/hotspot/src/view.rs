//! Per-interaction views over the hotspot table.
//!
//! A view is the subset of hotspots matching one filter, with marker sizes
//! re-normalized against that subset and Web-Mercator coordinates attached
//! for plotting. Views are transient; the table they come from is not
//! modified.

use geo::Point;
use road_safety_accident_models::{CasualtySeverity, Hotspot, WeatherCondition};
use serde::Serialize;

use crate::scale::scale_circle_sizes;
use crate::{HotspotError, HotspotTable};

/// Hour shown when no hour has been chosen.
pub const DEFAULT_HOUR: u8 = 12;

/// Which hotspots a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotFilter {
    /// Hotspots whose hour of day equals this value.
    Hour(u8),
    /// Hotspots whose reduced weather code equals this condition's code.
    Weather(WeatherCondition),
}

impl HotspotFilter {
    /// Builds an hour filter.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::InvalidHour`] if `hour` is above 23.
    pub const fn hour(hour: u8) -> Result<Self, HotspotError> {
        if hour > 23 {
            return Err(HotspotError::InvalidHour { hour });
        }
        Ok(Self::Hour(hour))
    }

    #[must_use]
    pub fn matches(&self, hotspot: &Hotspot) -> bool {
        match self {
            Self::Hour(hour) => hotspot.time == *hour,
            Self::Weather(condition) => hotspot.weather_conditions == condition.code(),
        }
    }

    /// Title displayed above the map for this filter.
    #[must_use]
    pub fn heading(&self) -> String {
        match self {
            Self::Hour(hour) => {
                format!("Spatial distribution of accident hotspots at {hour} hours")
            }
            Self::Weather(condition) => format!(
                "Spatial distribution of accident hotspots when the weather condition is {}",
                condition.label()
            ),
        }
    }
}

impl Default for HotspotFilter {
    fn default() -> Self {
        Self::Hour(DEFAULT_HOUR)
    }
}

/// A hotspot with projected plotting coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotPoint {
    #[serde(flatten)]
    pub hotspot: Hotspot,
    /// Web-Mercator x in meters.
    #[serde(rename = "LON")]
    pub x: f64,
    /// Web-Mercator y in meters.
    #[serde(rename = "LAT")]
    pub y: f64,
}

impl HotspotPoint {
    #[must_use]
    pub fn new(hotspot: Hotspot) -> Self {
        let projected =
            road_safety_spatial::project_point(Point::new(hotspot.longitude, hotspot.latitude));
        Self {
            hotspot,
            x: projected.x(),
            y: projected.y(),
        }
    }

    /// Marker color, present when the point carries a severity.
    #[must_use]
    pub fn color(&self) -> Option<&'static str> {
        self.hotspot.casualty_severity.map(CasualtySeverity::color)
    }

    /// Hover tooltip as (label, value) pairs.
    #[must_use]
    pub fn tooltip(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            (
                "No. of Casualties",
                self.hotspot.number_of_casualties.to_string(),
            ),
            (
                "(Long, Lat)",
                format!("({}, {})", self.hotspot.longitude, self.hotspot.latitude),
            ),
        ];
        if let Some(severity) = self.hotspot.casualty_severity {
            entries.push(("Severity", severity.to_string()));
        }
        entries
    }
}

/// One filtered, re-scaled, projected view of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotView {
    pub heading: String,
    pub size: f64,
    pub points: Vec<HotspotPoint>,
}

impl HotspotView {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Filters the table, re-normalizes marker sizes over the matching rows
/// only, and projects them.
///
/// An empty result is not an error.
///
/// # Errors
///
/// Returns [`HotspotError::InvalidSize`] if `size` is not a positive
/// finite number.
pub fn build_view(
    table: &HotspotTable,
    filter: HotspotFilter,
    size: f64,
) -> Result<HotspotView, HotspotError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(HotspotError::InvalidSize { size });
    }

    let mut selected: Vec<Hotspot> = table
        .hotspots()
        .iter()
        .filter(|h| filter.matches(h))
        .cloned()
        .collect();

    scale_circle_sizes(&mut selected, size);

    log::debug!(
        "View {filter:?} at size {size}: {} of {} hotspots",
        selected.len(),
        table.len()
    );

    Ok(HotspotView {
        heading: filter.heading(),
        size,
        points: selected.into_iter().map(HotspotPoint::new).collect(),
    })
}

#[cfg(test)]
mod tests {
    use road_safety_source::dataset_def::DatasetVariant;

    use super::*;

    fn hotspot(time: u8, weather: i32, casualties: f64) -> Hotspot {
        Hotspot {
            longitude: -1.5,
            latitude: 53.8,
            occurred_at: None,
            number_of_casualties: casualties,
            weather_conditions: weather,
            circle_sizes: 0.0,
            time,
            casualty_severity: None,
        }
    }

    fn table() -> HotspotTable {
        HotspotTable::new(
            DatasetVariant::Basic,
            vec![
                hotspot(8, 1, 1.0),
                hotspot(8, 2, 3.0),
                hotspot(12, 2, 6.0),
                hotspot(12, 1, 2.0),
            ],
        )
    }

    #[test]
    fn rejects_out_of_range_hour() {
        assert!(HotspotFilter::hour(23).is_ok());
        assert!(matches!(
            HotspotFilter::hour(24),
            Err(HotspotError::InvalidHour { hour: 24 })
        ));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn rescales_against_filtered_subset() {
        let view = build_view(&table(), HotspotFilter::Hour(8), 30.0).unwrap();
        assert_eq!(view.len(), 2);
        let sizes: Vec<f64> = view.points.iter().map(|p| p.hotspot.circle_sizes).collect();
        assert_eq!(sizes, vec![10.0, 30.0]);
    }

    #[test]
    fn filters_by_weather_code() {
        let view = build_view(
            &table(),
            HotspotFilter::Weather(WeatherCondition::RainingNoHighWinds),
            20.0,
        )
        .unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.points.iter().all(|p| p.hotspot.weather_conditions == 2));
        assert!(view.heading.ends_with("Raining no high winds"));
    }

    #[test]
    fn empty_match_is_an_empty_view() {
        let view = build_view(&table(), HotspotFilter::Hour(3), 20.0).unwrap();
        assert!(view.is_empty());
        assert_eq!(
            view.heading,
            "Spatial distribution of accident hotspots at 3 hours"
        );
    }

    #[test]
    fn base_table_is_untouched() {
        let table = table();
        let _ = build_view(&table, HotspotFilter::Hour(12), 40.0).unwrap();
        assert!(
            table
                .hotspots()
                .iter()
                .all(|h| h.circle_sizes.abs() < f64::EPSILON)
        );
    }

    #[test]
    fn rejects_non_positive_size() {
        assert!(build_view(&table(), HotspotFilter::default(), 0.0).is_err());
        assert!(build_view(&table(), HotspotFilter::default(), f64::NAN).is_err());
    }

    #[test]
    fn points_carry_projection_and_tooltip() {
        let mut h = hotspot(8, 1, 2.0);
        h.casualty_severity = Some(CasualtySeverity::Fatal);
        let point = HotspotPoint::new(h);
        let (x, y) = road_safety_spatial::to_web_mercator(-1.5, 53.8);
        assert_eq!(point.x.to_bits(), x.to_bits());
        assert_eq!(point.y.to_bits(), y.to_bits());
        assert_eq!(point.color(), Some("green"));

        let tooltip = point.tooltip();
        assert_eq!(tooltip[0], ("No. of Casualties", "2".to_owned()));
        assert_eq!(tooltip[1], ("(Long, Lat)", "(-1.5, 53.8)".to_owned()));
        assert_eq!(tooltip[2], ("Severity", "Fatal".to_owned()));
    }

    #[test]
    fn point_serializes_projected_columns() {
        let point = HotspotPoint::new(hotspot(8, 1, 2.0));
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("LON").is_some());
        assert!(json.get("LAT").is_some());
        assert!(json.get("Longitude").is_some());
        assert!(json.get("circle_sizes").is_some());
    }
}
