#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident hotspot aggregation, filtering, and marker scaling.
//!
//! [`prepare`] turns the raw tables of a dataset into an immutable
//! [`HotspotTable`]:
//!
//! 1. join accidents with casualties (severity variant only)
//! 2. parse the combined date/time of every row
//! 3. group by (longitude, latitude, timestamp\[, severity\]) and reduce
//! 4. normalize marker sizes and extract the hour of day
//!
//! [`view::build_view`] then produces per-interaction views, and
//! [`cache::HotspotCache`] keeps one table alive for the life of the
//! process.

pub mod aggregate;
pub mod cache;
pub mod join;
pub mod scale;
pub mod timestamp;
pub mod view;

use chrono::Timelike as _;
use road_safety_accident_models::{AccidentRecord, CasualtySeverity, Hotspot, InvalidSeverityError};
use road_safety_source::dataset_def::{DatasetDefinition, DatasetVariant};
use road_safety_source::{RawDataset, SourceError};
use serde::{Deserialize, Serialize};

use crate::aggregate::{PreparedRow, WeatherAggregation, group_rows};
use crate::scale::{DEFAULT_SIZE, scale_circle_sizes};

/// Errors raised while preparing or viewing hotspots.
#[derive(Debug, thiserror::Error)]
pub enum HotspotError {
    /// Loading a source table failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A combined date/time string could not be parsed.
    #[error("Invalid timestamp '{value}'")]
    Timestamp {
        /// The combined string that failed to parse.
        value: String,
    },

    /// A joined casualty has a severity code outside 1-3.
    #[error(transparent)]
    Severity(#[from] InvalidSeverityError),

    /// An hour filter above 23 was requested.
    #[error("Invalid hour {hour}: expected 0-23")]
    InvalidHour {
        /// The requested hour.
        hour: u8,
    },

    /// A marker size that is not a positive finite number was requested.
    #[error("Invalid marker size {size}")]
    InvalidSize {
        /// The requested size.
        size: f64,
    },
}

/// Settings for [`prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrepareOptions {
    /// Size ceiling for the table-wide `circle_sizes` column.
    pub size: f64,
    pub weather: WeatherAggregation,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            weather: WeatherAggregation::default(),
        }
    }
}

/// The aggregated, immutable hotspot table.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotTable {
    variant: DatasetVariant,
    hotspots: Vec<Hotspot>,
}

impl HotspotTable {
    #[must_use]
    pub const fn new(variant: DatasetVariant, hotspots: Vec<Hotspot>) -> Self {
        Self { variant, hotspots }
    }

    #[must_use]
    pub const fn variant(&self) -> DatasetVariant {
        self.variant
    }

    #[must_use]
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    /// Number of hotspots per hour of day. Hotspots with an hour above 23
    /// are not counted.
    #[must_use]
    pub fn hour_histogram(&self) -> [u64; 24] {
        let mut counts = [0u64; 24];
        for hotspot in &self.hotspots {
            if let Some(count) = counts.get_mut(usize::from(hotspot.time)) {
                *count += 1;
            } else {
                log::warn!("Hotspot with out-of-range hour {}", hotspot.time);
            }
        }
        counts
    }

    /// Number of hotspots per reduced weather code, in code order.
    #[must_use]
    pub fn weather_histogram(&self) -> std::collections::BTreeMap<i32, u64> {
        let mut counts = std::collections::BTreeMap::new();
        for hotspot in &self.hotspots {
            *counts.entry(hotspot.weather_conditions).or_insert(0) += 1;
        }
        counts
    }
}

/// Tallies of rows dropped before grouping.
#[derive(Debug, Default)]
struct Skipped {
    missing_key: usize,
    out_of_domain: usize,
}

/// Converts one accident into a groupable row.
///
/// Rows with a blank coordinate, date, or time have no group key and are
/// skipped, as are coordinates the projection cannot handle. A present but
/// malformed date/time is an error.
fn prepare_row(
    accident: &AccidentRecord,
    severity: Option<CasualtySeverity>,
    skipped: &mut Skipped,
) -> Result<Option<PreparedRow>, HotspotError> {
    let (Some(date), Some(time)) = (accident.date.as_deref(), accident.time.as_deref()) else {
        skipped.missing_key += 1;
        return Ok(None);
    };
    let occurred_at = timestamp::parse_timestamp(date, time)?;

    let (Some(longitude), Some(latitude)) = (accident.longitude, accident.latitude) else {
        skipped.missing_key += 1;
        return Ok(None);
    };

    if !road_safety_spatial::is_projectable(longitude, latitude) {
        skipped.out_of_domain += 1;
        return Ok(None);
    }

    Ok(Some(PreparedRow {
        longitude,
        latitude,
        occurred_at,
        number_of_casualties: accident.number_of_casualties,
        weather_conditions: accident.weather_conditions,
        severity,
    }))
}

/// Builds the hotspot table from raw tables.
///
/// # Errors
///
/// Returns [`HotspotError`] if a joined severity code is invalid or any
/// date/time fails to parse. No partial table is produced.
pub fn prepare(raw: RawDataset, options: &PrepareOptions) -> Result<HotspotTable, HotspotError> {
    let mut skipped = Skipped::default();
    let mut rows = Vec::with_capacity(raw.accidents.len());

    match raw.variant {
        DatasetVariant::Basic => {
            for accident in &raw.accidents {
                if let Some(row) = prepare_row(accident, None, &mut skipped)? {
                    rows.push(row);
                }
            }
        }
        DatasetVariant::Severity => {
            for (accident, severity) in join::inner_join(raw.accidents, &raw.casualties)? {
                if let Some(row) = prepare_row(&accident, Some(severity), &mut skipped)? {
                    rows.push(row);
                }
            }
        }
    }

    if skipped.missing_key > 0 {
        log::info!(
            "Skipped {} rows with a blank location, date, or time",
            skipped.missing_key
        );
    }
    if skipped.out_of_domain > 0 {
        log::warn!(
            "Skipped {} rows with coordinates outside the projectable range",
            skipped.out_of_domain
        );
    }

    let keep_timestamp = raw.variant == DatasetVariant::Basic;
    let buckets = group_rows(rows, options.weather);

    #[allow(clippy::cast_possible_truncation)]
    let mut hotspots: Vec<Hotspot> = buckets
        .into_iter()
        .map(|bucket| Hotspot {
            longitude: bucket.longitude,
            latitude: bucket.latitude,
            occurred_at: keep_timestamp.then_some(bucket.occurred_at),
            number_of_casualties: bucket.mean_casualties,
            weather_conditions: bucket.weather_conditions,
            circle_sizes: 0.0,
            time: bucket.occurred_at.hour() as u8,
            casualty_severity: bucket.severity,
        })
        .collect();

    scale_circle_sizes(&mut hotspots, options.size);

    log::info!("Prepared {} hotspots", hotspots.len());

    Ok(HotspotTable::new(raw.variant, hotspots))
}

/// Loads a dataset's tables and prepares its hotspot table.
///
/// # Errors
///
/// Returns [`HotspotError`] if loading or preparation fails.
pub async fn load(
    definition: &DatasetDefinition,
    options: &PrepareOptions,
) -> Result<HotspotTable, HotspotError> {
    let raw = road_safety_source::load_dataset(definition).await?;
    prepare(raw, options)
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::CasualtyRecord;

    use super::*;
    use crate::view::{HotspotFilter, build_view};

    fn accident(
        index: &str,
        lon: Option<f64>,
        time: &str,
        casualties: u32,
        weather: i32,
    ) -> AccidentRecord {
        AccidentRecord {
            accident_index: Some(index.to_owned()),
            longitude: lon,
            latitude: lon.map(|_| 51.5),
            date: Some("01/11/2016".to_owned()),
            time: Some(time.to_owned()),
            number_of_casualties: casualties,
            weather_conditions: weather,
        }
    }

    fn basic(accidents: Vec<AccidentRecord>) -> RawDataset {
        RawDataset {
            variant: DatasetVariant::Basic,
            accidents,
            casualties: Vec::new(),
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn same_bucket_rows_average_and_rescale() {
        let table = prepare(
            basic(vec![
                accident("A", Some(-0.1), "08:15", 2, 1),
                accident("B", Some(-0.1), "08:15", 4, 1),
            ]),
            &PrepareOptions::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        let hotspot = &table.hotspots()[0];
        assert_eq!(hotspot.number_of_casualties, 3.0);
        assert_eq!(hotspot.time, 8);
        assert!(hotspot.occurred_at.is_some());

        let view = build_view(&table, HotspotFilter::Hour(8), 20.0).unwrap();
        assert_eq!(view.points[0].hotspot.circle_sizes, 20.0);
    }

    #[test]
    fn every_hour_is_in_range() {
        let accidents = (0..24)
            .map(|h| accident("A", Some(f64::from(h) / 10.0), &format!("{h:02}:59"), 1, 1))
            .collect();
        let table = prepare(basic(accidents), &PrepareOptions::default()).unwrap();
        assert_eq!(table.len(), 24);
        assert!(table.hotspots().iter().all(|h| h.time <= 23));
        assert_eq!(table.hour_histogram(), [1u64; 24]);
    }

    #[test]
    fn hour_histogram_ignores_out_of_range_hours() {
        let hotspot = |time| Hotspot {
            longitude: -0.1,
            latitude: 51.5,
            occurred_at: None,
            number_of_casualties: 1.0,
            weather_conditions: 1,
            circle_sizes: 0.0,
            time,
            casualty_severity: None,
        };
        let table = HotspotTable::new(DatasetVariant::Basic, vec![hotspot(5), hotspot(24)]);

        let counts = table.hour_histogram();
        assert_eq!(counts[5], 1);
        assert_eq!(counts.iter().sum::<u64>(), 1);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn table_sizes_use_configured_ceiling() {
        let table = prepare(
            basic(vec![
                accident("A", Some(-0.1), "08:15", 1, 1),
                accident("B", Some(-0.2), "09:15", 4, 1),
            ]),
            &PrepareOptions {
                size: 40.0,
                ..PrepareOptions::default()
            },
        )
        .unwrap();
        let sizes: Vec<f64> = table.hotspots().iter().map(|h| h.circle_sizes).collect();
        assert_eq!(sizes, vec![40.0, 10.0]);
    }

    #[test]
    fn blank_locations_are_skipped() {
        let table = prepare(
            basic(vec![
                accident("A", None, "08:15", 1, 1),
                accident("B", Some(-0.1), "08:15", 1, 1),
            ]),
            &PrepareOptions::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn polar_latitudes_are_skipped() {
        let mut polar = accident("A", Some(-0.1), "08:15", 1, 1);
        polar.latitude = Some(90.0);
        let table = prepare(basic(vec![polar]), &PrepareOptions::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn malformed_time_fails_the_load() {
        let err = prepare(
            basic(vec![
                accident("A", Some(-0.1), "08:15", 1, 1),
                accident("B", Some(-0.1), "quarter past", 1, 1),
            ]),
            &PrepareOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HotspotError::Timestamp { .. }));
    }

    #[test]
    fn severity_variant_joins_and_labels() {
        let raw = RawDataset {
            variant: DatasetVariant::Severity,
            accidents: vec![
                accident("A", Some(-0.1), "17:05", 2, 2),
                accident("B", Some(-0.2), "17:05", 1, 1),
                accident("C", Some(-0.3), "17:05", 1, 1),
            ],
            casualties: vec![
                CasualtyRecord {
                    accident_index: "A".to_owned(),
                    casualty_severity: 3,
                },
                CasualtyRecord {
                    accident_index: "A".to_owned(),
                    casualty_severity: 1,
                },
                CasualtyRecord {
                    accident_index: "B".to_owned(),
                    casualty_severity: 3,
                },
            ],
        };

        let table = prepare(raw, &PrepareOptions::default()).unwrap();
        assert_eq!(table.variant(), DatasetVariant::Severity);
        assert_eq!(table.len(), 3);
        assert!(table.hotspots().iter().all(|h| h.occurred_at.is_none()));

        let severities: Vec<_> = table
            .hotspots()
            .iter()
            .map(|h| (h.longitude, h.casualty_severity))
            .collect();
        assert_eq!(
            severities,
            vec![
                (-0.2, Some(CasualtySeverity::Slight)),
                (-0.1, Some(CasualtySeverity::Fatal)),
                (-0.1, Some(CasualtySeverity::Slight)),
            ]
        );
    }

    #[test]
    fn weather_histogram_counts_reduced_codes() {
        let table = prepare(
            basic(vec![
                accident("A", Some(-0.1), "08:15", 1, 2),
                accident("B", Some(-0.1), "08:15", 1, 3),
                accident("C", Some(-0.2), "08:15", 1, 2),
            ]),
            &PrepareOptions::default(),
        )
        .unwrap();
        let histogram = table.weather_histogram();
        assert_eq!(histogram.get(&2), Some(&2));
        assert_eq!(histogram.len(), 1);
    }
}
