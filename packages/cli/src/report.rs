//! Plain-text rendering of datasets, table summaries, and hotspot views.

use road_safety_accident_models::WeatherCondition;
use road_safety_hotspot::HotspotTable;
use road_safety_hotspot::view::HotspotView;
use road_safety_source::dataset_def::{DatasetDefinition, DatasetVariant};

const fn variant_name(variant: DatasetVariant) -> &'static str {
    match variant {
        DatasetVariant::Basic => "basic",
        DatasetVariant::Severity => "severity",
    }
}

/// One line per registered dataset.
pub fn dataset_lines(datasets: &[DatasetDefinition]) -> Vec<String> {
    datasets
        .iter()
        .map(|d| {
            format!(
                "{:<28} {:<9} {}",
                d.id,
                variant_name(d.variant),
                d.name
            )
        })
        .collect()
}

/// Hotspot counts by hour and by reduced weather code.
pub fn summary_lines(definition: &DatasetDefinition, table: &HotspotTable) -> Vec<String> {
    let mut lines = vec![
        format!("Dataset:  {} ({})", definition.name, definition.id),
        format!("Variant:  {}", variant_name(table.variant())),
        format!("Hotspots: {}", table.len()),
        String::new(),
        "By hour:".to_owned(),
    ];

    for (hour, count) in table.hour_histogram().iter().enumerate() {
        if *count > 0 {
            lines.push(format!("  {hour:>2}:00  {count}"));
        }
    }

    lines.push(String::new());
    lines.push("By weather:".to_owned());
    for (code, count) in table.weather_histogram() {
        let label = WeatherCondition::from_code(i64::from(code))
            .map_or("(unmapped code)", WeatherCondition::label);
        lines.push(format!("  {code:>2} {label:<24} {count}"));
    }

    lines
}

/// Heading followed by one line per plotted point.
pub fn view_lines(view: &HotspotView) -> Vec<String> {
    let mut lines = vec![view.heading.clone()];

    if view.is_empty() {
        lines.push("No hotspots match.".to_owned());
        return lines;
    }

    for point in &view.points {
        let hotspot = &point.hotspot;
        let mut line = format!(
            "({:.5}, {:.5})  casualties {:<6} weather {} size {:.2}",
            hotspot.longitude,
            hotspot.latitude,
            hotspot.number_of_casualties,
            hotspot.weather_conditions,
            hotspot.circle_sizes,
        );
        if let Some(severity) = hotspot.casualty_severity {
            line.push_str(&format!("  {severity} ({})", severity.color()));
        }
        lines.push(line);
    }

    lines.push(format!("{} hotspots", view.len()));
    lines
}
