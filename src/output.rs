//! Persistence for cleaned datasets and the analysis report.
//!
//! Cleaned datasets are CSV files with a header row taken from the record
//! field names. The report is pretty-printed JSON.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

pub const BOOKING_CLEANED_FILE: &str = "booking_cleaned.csv";
pub const TRIPADVISOR_CLEANED_FILE: &str = "tripadvisor_cleaned.csv";
pub const REPORT_FILE: &str = "analysis_report.json";

/// Writes `records` to `path` as CSV, replacing any existing file.
///
/// Concurrent writers to the same path are not coordinated; the last one wins.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    create_parent_dir(path)?;
    debug!(path = %path.display(), rows = records.len(), "Writing cleaned dataset");

    let file = File::create(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "Cleaned dataset saved");
    Ok(())
}

/// Reads a cleaned dataset written by [`write_records`].
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T =
            result.with_context(|| format!("invalid cleaned row in '{}'", path.display()))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "Cleaned dataset loaded");
    Ok(rows)
}

/// Writes `value` to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    create_parent_dir(path)?;
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write '{}'", path.display()))?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        BOOKING_SOURCE, CleanedHotelRecord, CleanedReviewRecord, ReviewLabel, RoomCategory,
        TRIPADVISOR_SOURCE,
    };

    fn hotel() -> CleanedHotelRecord {
        CleanedHotelRecord {
            hotel_name: "Grand Hotel".to_string(),
            location: Some("Gulshan".to_string()),
            rating: 8.4,
            review_score: Some(ReviewLabel::VeryGood),
            num_reviews: Some(1234),
            room_score: None,
            room_type: Some("Deluxe Suite".to_string()),
            bed_type: Some("1 king bed".to_string()),
            price_bdt: 12000.0,
            price_eur: 100.0,
            source: BOOKING_SOURCE.to_string(),
            room_category: RoomCategory::Suite,
        }
    }

    #[test]
    fn test_write_records_header_and_two_decimal_price() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOOKING_CLEANED_FILE);

        write_records(&path, &[hotel()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "hotel_name,location,rating,review_score,num_reviews,room_score,room_type,bed_type,price_bdt,price_eur,source,room_category"
        );
        assert!(lines[1].contains(",100.00,Booking.com,Suite"));
        assert!(lines[1].contains(",Very Good,"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_records_read_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(TRIPADVISOR_CLEANED_FILE);
        let review = CleanedReviewRecord {
            hotel_name: "Sea Pearl".to_string(),
            price_bdt: 7777.0,
            price_eur: 64.81,
            num_reviews: None,
            comment: Some("quiet, clean".to_string()),
            source: TRIPADVISOR_SOURCE.to_string(),
        };

        write_records(&path, std::slice::from_ref(&review)).unwrap();
        let rows: Vec<CleanedReviewRecord> = read_records(&path).unwrap();

        assert_eq!(rows, vec![review]);
    }

    #[test]
    fn test_write_records_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOOKING_CLEANED_FILE);

        write_records(&path, &[hotel(), hotel()]).unwrap();
        write_records(&path, &[hotel()]).unwrap();

        let rows: Vec<CleanedHotelRecord> = read_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_read_records_missing_file() {
        let result: Result<Vec<CleanedHotelRecord>> =
            read_records(Path::new("/nonexistent/booking_cleaned.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE);

        write_json(&path, &hotel()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["hotel_name"], "Grand Hotel");
    }
}
