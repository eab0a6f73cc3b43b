//! HTTP handler functions for the road safety API.

use actix_web::{HttpResponse, web};
use road_safety_accident_models::{CasualtySeverity, InvalidWeatherError, WeatherCondition};
use road_safety_hotspot::HotspotError;
use road_safety_hotspot::scale::{DEFAULT_SIZE, SIZE_RANGE};
use road_safety_hotspot::view::{DEFAULT_HOUR, HotspotFilter, build_view};
use road_safety_server_models::{
    ApiHealth, ApiHotspotView, ApiSeverity, ApiWeatherCondition, HotspotQueryParams, ViewMode,
};

use crate::AppState;

/// Reasons a hotspot query is rejected before any filtering happens.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Filter(#[from] HotspotError),

    #[error(transparent)]
    Weather(#[from] InvalidWeatherError),

    #[error("weather mode requires a 'weather' parameter")]
    MissingWeather,

    #[error("size {size} is outside {}-{}", SIZE_RANGE.start(), SIZE_RANGE.end())]
    SizeOutOfRange { size: f64 },
}

/// Turns query parameters into a filter and a marker size, applying the
/// control defaults (hour mode, hour 12, size 20).
///
/// # Errors
///
/// Returns [`QueryError`] for an hour above 23, an unknown weather
/// condition, or a size outside [`SIZE_RANGE`].
pub fn resolve_query(params: &HotspotQueryParams) -> Result<(HotspotFilter, f64), QueryError> {
    let size = params.size.unwrap_or(DEFAULT_SIZE);
    if !SIZE_RANGE.contains(&size) {
        return Err(QueryError::SizeOutOfRange { size });
    }

    let filter = match params.mode.unwrap_or_default() {
        ViewMode::Hour => HotspotFilter::hour(params.hour.unwrap_or(DEFAULT_HOUR))?,
        ViewMode::Weather => {
            let weather = params
                .weather
                .as_deref()
                .ok_or(QueryError::MissingWeather)?;
            HotspotFilter::Weather(WeatherCondition::lookup(weather)?)
        }
    };

    Ok((filter, size))
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let hotspots = state.cache.loaded().map_or(0, |table| table.len());

    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        hotspots,
    })
}

/// `GET /api/weather-conditions`
///
/// Returns the weather selector entries in selector order.
pub async fn weather_conditions() -> HttpResponse {
    let entries: Vec<ApiWeatherCondition> = WeatherCondition::all()
        .iter()
        .copied()
        .map(ApiWeatherCondition::from)
        .collect();

    HttpResponse::Ok().json(entries)
}

/// `GET /api/severities`
///
/// Returns the severity legend with marker colors.
pub async fn severities() -> HttpResponse {
    let entries: Vec<ApiSeverity> = CasualtySeverity::all()
        .iter()
        .copied()
        .map(ApiSeverity::from)
        .collect();

    HttpResponse::Ok().json(entries)
}

/// `GET /api/hotspots`
///
/// Filters the hotspot table by hour or weather, re-scales marker sizes
/// over the matching rows, and returns projected points.
pub async fn hotspots(
    state: web::Data<AppState>,
    params: web::Query<HotspotQueryParams>,
) -> HttpResponse {
    let (filter, size) = match resolve_query(&params) {
        Ok(resolved) => resolved,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    let Some(table) = state.cache.loaded() else {
        return HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "Hotspot table is not loaded"
        }));
    };

    match build_view(&table, filter, size) {
        Ok(view) => HttpResponse::Ok().json(ApiHotspotView::from(view)),
        Err(e) => {
            log::error!("Failed to build hotspot view: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to build hotspot view"
            }))
        }
    }
}
