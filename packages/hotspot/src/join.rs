//! Inner join of accidents with casualties on `Accident_Index`.

use std::collections::BTreeMap;

use road_safety_accident_models::{AccidentRecord, CasualtyRecord, CasualtySeverity};

use crate::HotspotError;

/// Joins every accident with every casualty sharing its index.
///
/// Inner-join semantics: accidents with no matching casualty (or no index
/// at all) and casualties with no matching accident are dropped. An
/// accident with `n` casualties yields `n` rows. Output follows accident
/// order, then casualty order within an accident.
///
/// # Errors
///
/// Returns [`HotspotError::Severity`] if a matched casualty carries a
/// severity code outside 1-3.
pub fn inner_join(
    accidents: Vec<AccidentRecord>,
    casualties: &[CasualtyRecord],
) -> Result<Vec<(AccidentRecord, CasualtySeverity)>, HotspotError> {
    let mut by_index: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for casualty in casualties {
        by_index
            .entry(casualty.accident_index.as_str())
            .or_default()
            .push(casualty.casualty_severity);
    }

    let mut joined = Vec::new();
    let mut unmatched = 0usize;

    for accident in accidents {
        let Some(codes) = accident
            .accident_index
            .as_deref()
            .and_then(|idx| by_index.get(idx))
        else {
            unmatched += 1;
            continue;
        };

        for code in codes {
            joined.push((accident.clone(), CasualtySeverity::from_value(*code)?));
        }
    }

    log::info!(
        "Joined {} accident/casualty rows ({unmatched} accidents without casualties dropped)",
        joined.len()
    );

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accident(index: Option<&str>) -> AccidentRecord {
        AccidentRecord {
            accident_index: index.map(str::to_owned),
            longitude: Some(-1.0),
            latitude: Some(52.0),
            date: Some("01/11/2016".to_owned()),
            time: Some("10:00".to_owned()),
            number_of_casualties: 1,
            weather_conditions: 1,
        }
    }

    fn casualty(index: &str, severity: i64) -> CasualtyRecord {
        CasualtyRecord {
            accident_index: index.to_owned(),
            casualty_severity: severity,
        }
    }

    #[test]
    fn keeps_only_matching_keys() {
        let accidents = vec![accident(Some("A")), accident(Some("B")), accident(Some("C"))];
        let casualties = vec![casualty("B", 3), casualty("D", 1)];

        let joined = inner_join(accidents, &casualties).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].0.accident_index.as_deref(), Some("B"));
        assert_eq!(joined[0].1, CasualtySeverity::Slight);
    }

    #[test]
    fn one_row_per_matching_pair() {
        let accidents = vec![accident(Some("A")), accident(Some("B"))];
        let casualties = vec![
            casualty("A", 1),
            casualty("A", 2),
            casualty("A", 3),
            casualty("B", 2),
        ];

        let joined = inner_join(accidents, &casualties).unwrap();
        let severities: Vec<_> = joined.iter().map(|(_, s)| *s).collect();
        assert_eq!(
            severities,
            vec![
                CasualtySeverity::Fatal,
                CasualtySeverity::Serious,
                CasualtySeverity::Slight,
                CasualtySeverity::Serious,
            ]
        );
    }

    #[test]
    fn accidents_without_index_never_match() {
        let joined = inner_join(vec![accident(None)], &[casualty("", 3)]).unwrap();
        assert!(joined.is_empty());
    }

    #[test]
    fn invalid_severity_fails_the_join() {
        let err = inner_join(vec![accident(Some("A"))], &[casualty("A", 7)]).unwrap_err();
        assert!(matches!(err, HotspotError::Severity(_)));
    }

    #[test]
    fn unmatched_invalid_severity_is_ignored() {
        let joined = inner_join(vec![accident(Some("A"))], &[casualty("Z", 7)]).unwrap();
        assert!(joined.is_empty());
    }
}
