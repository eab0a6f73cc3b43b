//! CSV table download and typed parsing.
//!
//! Reads a table (optionally gzip-compressed) from a URL or a local path,
//! checks that every required column is present in the header row, and
//! deserializes each row into a typed record. Columns the record type does
//! not name are ignored.

use std::collections::BTreeSet;
use std::io::Read as _;

use serde::de::DeserializeOwned;

use crate::SourceError;
use crate::dataset_def::DatasetLocation;

/// Fetches the raw bytes of a table, decompressing gzip when the location
/// ends in `.gz`.
///
/// No retries are attempted: a failed download aborts the load.
///
/// # Errors
///
/// Returns [`SourceError`] if the download, file read, or decompression
/// fails, or the server answers with a non-success status.
pub async fn fetch_bytes(location: &DatasetLocation) -> Result<Vec<u8>, SourceError> {
    let bytes: Vec<u8> = match location {
        DatasetLocation::Url(url) => {
            let response = reqwest::get(url).await?.error_for_status()?;
            response.bytes().await?.to_vec()
        }
        DatasetLocation::Path(path) => tokio::fs::read(path).await?,
    };

    log::debug!("Read {} bytes from {location}", bytes.len());

    if location.is_gzipped() {
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        log::debug!("Decompressed to {} bytes", decompressed.len());
        Ok(decompressed)
    } else {
        Ok(bytes)
    }
}

/// Parses CSV bytes into typed records after validating the header row.
///
/// `label` names the table in error messages and logs.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if any of `required` is absent
/// from the header row, or [`SourceError::Csv`] if a row cannot be
/// deserialized.
pub fn parse_table<T: DeserializeOwned>(
    bytes: &[u8],
    required: &[&str],
    label: &str,
) -> Result<Vec<T>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: BTreeSet<String> = reader.headers()?.iter().map(str::to_owned).collect();

    if let Some(missing) = required.iter().find(|col| !headers.contains(**col)) {
        return Err(SourceError::MissingColumn {
            column: (*missing).to_owned(),
            table: label.to_owned(),
        });
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;

    log::info!("Parsed {} records from {label}", records.len());

    Ok(records)
}

/// Fetches and parses a table in one step.
///
/// # Errors
///
/// See [`fetch_bytes`] and [`parse_table`].
pub async fn load_table<T: DeserializeOwned>(
    location: &DatasetLocation,
    required: &[&str],
) -> Result<Vec<T>, SourceError> {
    log::info!("Loading table from {location}");
    let bytes = fetch_bytes(location).await?;
    parse_table(&bytes, required, &location.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use road_safety_accident_models::{AccidentRecord, CasualtyRecord};

    use super::*;

    const ACCIDENTS: &str = "\
Accident_Index,Longitude,Latitude,Police_Force,Date,Time,Number_of_Casualties,Weather_Conditions
2016010000005,-0.279323,51.584754,1,01/11/2016,02:30,1,1
2016010000006,,,1,01/11/2016,00:37,2,2
";

    #[test]
    fn parses_required_columns_and_ignores_extras() {
        let rows: Vec<AccidentRecord> =
            parse_table(ACCIDENTS.as_bytes(), AccidentRecord::REQUIRED_COLUMNS, "test").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].accident_index.as_deref(), Some("2016010000005"));
        assert_eq!(rows[0].longitude, Some(-0.279_323));
        assert_eq!(rows[0].time.as_deref(), Some("02:30"));
        assert_eq!(rows[1].number_of_casualties, 2);
        assert_eq!(rows[1].longitude, None);
        assert_eq!(rows[1].latitude, None);
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let csv = "Accident_Index,Longitude,Latitude,Date,Time,Number_of_Casualties\n";
        let err =
            parse_table::<AccidentRecord>(csv.as_bytes(), AccidentRecord::REQUIRED_COLUMNS, "t")
                .unwrap_err();
        match err {
            SourceError::MissingColumn { column, .. } => assert_eq!(column, "Weather_Conditions"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_value_is_a_load_error() {
        let csv = "Accident_Index,Casualty_Severity\nA1,severe\n";
        let err =
            parse_table::<CasualtyRecord>(csv.as_bytes(), CasualtyRecord::REQUIRED_COLUMNS, "t")
                .unwrap_err();
        assert!(matches!(err, SourceError::Csv(_)));
    }

    #[tokio::test]
    async fn loads_gzipped_file() {
        let path = std::env::temp_dir().join(format!(
            "road_safety_source_{}_casualties.csv.gz",
            std::process::id()
        ));
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder =
                flate2::write::GzEncoder::new(file, flate2::Compression::default());
            encoder
                .write_all(b"Accident_Index,Casualty_Severity\nA1,3\nA1,2\n")
                .unwrap();
            encoder.finish().unwrap();
        }

        let location = DatasetLocation::Path(path.clone());
        let rows: Vec<CasualtyRecord> = load_table(&location, CasualtyRecord::REQUIRED_COLUMNS)
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].casualty_severity, 2);
    }

    #[tokio::test]
    async fn unreachable_file_is_a_load_error() {
        let location = DatasetLocation::parse("/definitely/not/here.csv");
        let err = fetch_bytes(&location).await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
