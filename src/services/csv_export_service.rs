use csv::WriterBuilder;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{encode_revenues, ForecastRecord};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Start Year")]
    start_year: i32,
    #[serde(rename = "Revenues")]
    revenues: String,
    #[serde(rename = "System Size")]
    system_size: String,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Chemistry")]
    chemistry: &'a str,
    #[serde(rename = "Use Case")]
    use_case: &'a str,
}

impl<'a> From<&'a ForecastRecord> for CsvRow<'a> {
    fn from(record: &'a ForecastRecord) -> Self {
        Self {
            start_year: record.start_year,
            revenues: encode_revenues(&record.revenues),
            system_size: record.metadata.system_size.to_string(),
            location: record.metadata.location.as_str(),
            chemistry: record.metadata.battery_chemistry.as_str(),
            use_case: record.metadata.use_case.as_str(),
        }
    }
}

const HEADER: [&str; 6] = [
    "Start Year",
    "Revenues",
    "System Size",
    "Location",
    "Chemistry",
    "Use Case",
];

/// Renders records as CSV. The revenue list keeps its stored comma-joined form
/// inside a single quoted field.
pub fn export_csv(records: &[ForecastRecord]) -> Result<String, AppError> {
    // Header is written by hand so an empty export still carries the column names.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::Internal(format!("Failed to write CSV header: {}", e)))?;

    for record in records {
        writer
            .serialize(CsvRow::from(record))
            .map_err(|e| AppError::Internal(format!("Failed to write CSV row: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatteryChemistry, ForecastMetadata, Location, NewForecast, UseCase};

    fn record() -> ForecastRecord {
        ForecastRecord::new(NewForecast {
            start_year: 2025,
            revenues: vec![120000.0, 115000.5, -2000.0],
            metadata: ForecastMetadata {
                system_size: 50.0,
                location: Location::NorthGermany,
                battery_chemistry: BatteryChemistry::Lfp,
                use_case: UseCase::WholesaleTrading,
                premium: true,
            },
        })
    }

    #[test]
    fn test_export_layout() {
        let csv = export_csv(&[record()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Start Year,Revenues,System Size,Location,Chemistry,Use Case")
        );
        assert_eq!(
            lines.next(),
            Some("2025,\"120000,115000.5,-2000\",50,North Germany,LFP,Wholesale Trading")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_reads_back() {
        let exported = export_csv(&[record(), record()]).unwrap();
        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "120000,115000.5,-2000");
        assert_eq!(&rows[0][5], "Wholesale Trading");
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = export_csv(&[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["Start Year,Revenues,System Size,Location,Chemistry,Use Case"]);
    }
}
