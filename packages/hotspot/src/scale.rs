//! Marker size normalization.

use std::ops::RangeInclusive;

use road_safety_accident_models::Hotspot;

/// Size ceiling applied when the table is first prepared.
pub const DEFAULT_SIZE: f64 = 20.0;

/// Range offered by the marker-zoom control.
pub const SIZE_RANGE: RangeInclusive<f64> = 10.0..=40.0;

/// Sets `circle_sizes = casualties * size / max(casualties)` across the
/// given rows.
///
/// The row(s) holding the maximum casualty count get exactly `size`. When
/// the maximum is not positive (every count is zero) it is taken as 1, so
/// all sizes come out as 0 instead of NaN.
#[allow(clippy::float_cmp)]
pub fn scale_circle_sizes(hotspots: &mut [Hotspot], size: f64) {
    let max = hotspots
        .iter()
        .map(|h| h.number_of_casualties)
        .fold(f64::NEG_INFINITY, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };

    for hotspot in hotspots {
        hotspot.circle_sizes = if hotspot.number_of_casualties == max {
            size
        } else {
            hotspot.number_of_casualties * size / max
        };
    }
}
