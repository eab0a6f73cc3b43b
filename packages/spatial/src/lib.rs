#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! WGS84 to Web-Mercator (EPSG:3857) forward projection.
//!
//! Web map tile providers lay tiles out in Web-Mercator meters, so points
//! plotted over them must be projected with exactly the same formula and
//! earth radius. The arithmetic here is written in the same operation
//! order as the reference formula so results are bit-for-bit identical:
//!
//! ```text
//! X = lon * (R * pi / 180)
//! Y = ln(tan((90 + lat) * pi / 360)) * R
//! ```
//!
//! The formula diverges at the poles. Callers must check
//! [`is_projectable`] (or filter rows beforehand) when latitudes may reach
//! +/-90.

use std::f64::consts::PI;

use geo::Point;

/// Web-Mercator sphere radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Projects a longitude/latitude pair in degrees to Web-Mercator `(x, y)`
/// in meters.
#[must_use]
pub fn to_web_mercator(longitude: f64, latitude: f64) -> (f64, f64) {
    let x = longitude * (EARTH_RADIUS_M * PI / 180.0);
    let y = ((90.0 + latitude) * PI / 360.0).tan().ln() * EARTH_RADIUS_M;
    (x, y)
}

/// Projects a `geo` point whose `x` is longitude and `y` is latitude.
#[must_use]
pub fn project_point(point: Point<f64>) -> Point<f64> {
    let (x, y) = to_web_mercator(point.x(), point.y());
    Point::new(x, y)
}

/// Whether a coordinate lies in the domain where the projection is finite:
/// longitude in \[-180, 180\] and latitude strictly between the poles.
#[must_use]
pub fn is_projectable(longitude: f64, latitude: f64) -> bool {
    longitude.is_finite()
        && latitude.is_finite()
        && (-180.0..=180.0).contains(&longitude)
        && latitude > -90.0
        && latitude < 90.0
}
