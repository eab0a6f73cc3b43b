//! Grouping of accident rows into hotspot buckets.
//!
//! Rows are bucketed by exact (longitude, latitude, timestamp\[, severity\])
//! and reduced to the mean casualty count plus a single weather code per
//! bucket. Buckets come out sorted by key.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use road_safety_accident_models::CasualtySeverity;
use serde::{Deserialize, Serialize};

/// How the weather codes of a bucket are reduced to one code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAggregation {
    /// Arithmetic mean of the codes, truncated toward zero.
    ///
    /// This is a lossy reduction of categorical data: a bucket holding
    /// codes 2 and 4 reports 3, a condition none of its accidents had.
    #[default]
    TruncatedMean,
    /// Most frequent code; ties go to the lowest code.
    Majority,
}

/// One accident (or accident/casualty pair) ready for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub longitude: f64,
    pub latitude: f64,
    pub occurred_at: NaiveDateTime,
    pub number_of_casualties: u32,
    pub weather_conditions: i32,
    pub severity: Option<CasualtySeverity>,
}

/// One reduced bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub longitude: f64,
    pub latitude: f64,
    pub occurred_at: NaiveDateTime,
    pub severity: Option<CasualtySeverity>,
    /// Number of rows that fell into the bucket.
    pub rows: u32,
    pub mean_casualties: f64,
    pub weather_conditions: i32,
}

/// Totally ordered coordinate so it can key a [`BTreeMap`].
#[derive(Debug, Clone, Copy)]
struct Coord(f64);

impl Coord {
    /// Folds `-0.0` into `0.0` so both land in one bucket.
    const fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }
}

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coord {}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    longitude: Coord,
    latitude: Coord,
    occurred_at: NaiveDateTime,
    severity: Option<CasualtySeverity>,
}

#[derive(Default)]
struct BucketAccum {
    rows: u32,
    casualties_sum: f64,
    weather_sum: f64,
    weather_counts: BTreeMap<i32, u32>,
}

impl BucketAccum {
    fn push(&mut self, row: &PreparedRow) {
        self.rows += 1;
        self.casualties_sum += f64::from(row.number_of_casualties);
        self.weather_sum += f64::from(row.weather_conditions);
        *self.weather_counts.entry(row.weather_conditions).or_insert(0) += 1;
    }

    fn weather(&self, strategy: WeatherAggregation) -> i32 {
        match strategy {
            WeatherAggregation::TruncatedMean => {
                truncate_code(self.weather_sum / f64::from(self.rows))
            }
            WeatherAggregation::Majority => {
                let mut best: Option<(i32, u32)> = None;
                for (&code, &count) in &self.weather_counts {
                    if best.is_none_or(|(_, c)| count > c) {
                        best = Some((code, count));
                    }
                }
                best.map_or(0, |(code, _)| code)
            }
        }
    }
}

/// Truncates an averaged code toward zero (2.9 becomes 2, not 3).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn truncate_code(mean: f64) -> i32 {
    mean.trunc() as i32
}

/// Groups rows into buckets sorted by key.
#[must_use]
pub fn group_rows<I>(rows: I, strategy: WeatherAggregation) -> Vec<Bucket>
where
    I: IntoIterator<Item = PreparedRow>,
{
    let mut buckets: BTreeMap<BucketKey, BucketAccum> = BTreeMap::new();

    for row in rows {
        let key = BucketKey {
            longitude: Coord::new(row.longitude),
            latitude: Coord::new(row.latitude),
            occurred_at: row.occurred_at,
            severity: row.severity,
        };
        buckets.entry(key).or_default().push(&row);
    }

    buckets
        .into_iter()
        .map(|(key, acc)| Bucket {
            longitude: key.longitude.0,
            latitude: key.latitude.0,
            occurred_at: key.occurred_at,
            severity: key.severity,
            rows: acc.rows,
            mean_casualties: acc.casualties_sum / f64::from(acc.rows),
            weather_conditions: acc.weather(strategy),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 11, 1)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn row(lon: f64, casualties: u32, weather: i32) -> PreparedRow {
        PreparedRow {
            longitude: lon,
            latitude: 51.5,
            occurred_at: ts(8),
            number_of_casualties: casualties,
            weather_conditions: weather,
            severity: None,
        }
    }

    #[test]
    fn averages_casualties_within_bucket() {
        let buckets = group_rows(
            vec![row(-0.1, 2, 1), row(-0.1, 4, 1)],
            WeatherAggregation::TruncatedMean,
        );
        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].mean_casualties - 3.0).abs() < f64::EPSILON);
        assert_eq!(buckets[0].rows, 2);
    }

    #[test]
    fn distinct_keys_stay_separate() {
        let mut other_time = row(-0.1, 1, 1);
        other_time.occurred_at = ts(9);
        let mut other_severity = row(-0.1, 1, 1);
        other_severity.severity = Some(CasualtySeverity::Fatal);

        let buckets = group_rows(
            vec![row(-0.1, 1, 1), row(-0.2, 1, 1), other_time, other_severity],
            WeatherAggregation::TruncatedMean,
        );
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn buckets_are_sorted_by_key() {
        let buckets = group_rows(
            vec![row(1.0, 1, 1), row(-1.0, 1, 1), row(0.5, 1, 1)],
            WeatherAggregation::TruncatedMean,
        );
        let lons: Vec<f64> = buckets.iter().map(|b| b.longitude).collect();
        assert_eq!(lons, vec![-1.0, 0.5, 1.0]);
    }

    #[test]
    fn weather_mean_is_truncated_not_rounded() {
        assert_eq!(truncate_code(2.9), 2);
        assert_eq!(truncate_code(-0.5), 0);

        // Mean of 2, 3, 3 is 2.67, truncated to 2.
        let buckets = group_rows(
            vec![row(0.0, 1, 2), row(0.0, 1, 3), row(0.0, 1, 3)],
            WeatherAggregation::TruncatedMean,
        );
        assert_eq!(buckets[0].weather_conditions, 2);
    }

    #[test]
    fn mixed_codes_collapse_to_unrelated_code() {
        let buckets = group_rows(
            vec![row(0.0, 1, 2), row(0.0, 1, 4)],
            WeatherAggregation::TruncatedMean,
        );
        assert_eq!(buckets[0].weather_conditions, 3);
    }

    #[test]
    fn majority_picks_most_frequent_code() {
        let buckets = group_rows(
            vec![row(0.0, 1, 2), row(0.0, 1, 3), row(0.0, 1, 3)],
            WeatherAggregation::Majority,
        );
        assert_eq!(buckets[0].weather_conditions, 3);
    }

    #[test]
    fn majority_ties_go_to_lowest_code() {
        let buckets = group_rows(
            vec![row(0.0, 1, 5), row(0.0, 1, 2)],
            WeatherAggregation::Majority,
        );
        assert_eq!(buckets[0].weather_conditions, 2);
    }

    #[test]
    fn signed_zero_coordinates_share_a_bucket() {
        let mut south = row(-0.0, 4, 1);
        south.latitude = -0.0;
        let mut north = row(0.0, 2, 1);
        north.latitude = 0.0;

        let buckets = group_rows(vec![south, north], WeatherAggregation::TruncatedMean);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].rows, 2);
        assert!(buckets[0].longitude.is_sign_positive());
    }
}
