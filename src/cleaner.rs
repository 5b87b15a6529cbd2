//! Record cleaner: raw CSV rows in, validated typed records out.
//!
//! Both sources have a fixed, known column layout. A Booking.com row of the
//! wrong width aborts the run. A TripAdvisor row with too many fields is
//! skipped and counted; a short one is padded with empty cells. After parsing,
//! a row either has every required field and a price inside the band, or it
//! is dropped.

use crate::config::CleaningConfig;
use crate::error::PipelineError;
use crate::parser::{
    decode_latin1, parse_count, parse_currency, parse_decimal, round2, strip_ordinal_prefix,
    trim_text,
};
use crate::records::{
    BOOKING_SOURCE, CleanedHotelRecord, CleanedReviewRecord, ReviewLabel, RoomCategory,
    TRIPADVISOR_SOURCE,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Static description of one source file.
#[derive(Debug)]
pub struct SourceSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    /// Skip over-wide rows and pad short ones instead of aborting.
    pub skip_malformed: bool,
}

pub static BOOKING_SCHEMA: SourceSchema = SourceSchema {
    name: BOOKING_SOURCE,
    columns: &[
        "hotel_name",
        "location",
        "rating",
        "review_score",
        "num_reviews",
        "room_score",
        "room_type",
        "bed_type",
        "price_bdt",
    ],
    skip_malformed: false,
};

pub static TRIPADVISOR_SCHEMA: SourceSchema = SourceSchema {
    name: TRIPADVISOR_SOURCE,
    columns: &["hotel_name", "price_bdt", "num_reviews", "comment"],
    skip_malformed: true,
};

/// One untyped data row. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    fields: Vec<Option<String>>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<Option<String>>) -> Self {
        Self { line, fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|f| f.as_deref())
    }
}

/// Every readable row of one source file.
#[derive(Debug)]
pub struct RawTable {
    pub schema: &'static SourceSchema,
    pub records: Vec<RawRecord>,
    /// Rows dropped while reading because they had too many fields.
    pub malformed_skipped: usize,
}

/// Row counts of one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub source: String,
    pub rows_read: usize,
    pub malformed_skipped: usize,
    pub dropped_missing_required: usize,
    pub dropped_out_of_band: usize,
    /// Rows that had price (and rating) inside the band but no hotel name.
    pub dropped_blank_name: usize,
    pub retained: usize,
}

/// Cleaned rows of one source plus the summary of how they were produced.
///
/// Rows are only reachable through shared references once built.
#[derive(Debug, Clone)]
pub struct CleanedDataset<T> {
    records: Vec<T>,
    summary: CleaningSummary,
}

impl<T> CleanedDataset<T> {
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn summary(&self) -> &CleaningSummary {
        &self.summary
    }

    pub fn into_parts(self) -> (Vec<T>, CleaningSummary) {
        (self.records, self.summary)
    }
}

enum RowOutcome<T> {
    Kept(T),
    MissingRequired,
    OutOfBand,
    BlankName,
}

/// Opens `path` and reads it against `schema`.
///
/// # Errors
///
/// [`PipelineError::SourceMissing`] if the file does not exist, and
/// [`PipelineError::SchemaMismatch`] if the header (or, for sources that do
/// not skip malformed rows, any row) has the wrong number of columns.
pub fn read_raw_records(
    path: &Path,
    schema: &'static SourceSchema,
) -> Result<RawTable, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::SourceMissing {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)?;
    parse_raw_records(file, schema)
}

/// Reads CSV bytes against `schema`, decoding every cell as Latin-1.
pub fn parse_raw_records<R: Read>(
    reader: R,
    schema: &'static SourceSchema,
) -> Result<RawTable, PipelineError> {
    let expected = schema.columns.len();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_len = rdr.byte_headers()?.len();
    if header_len != expected {
        return Err(PipelineError::SchemaMismatch {
            source_name: schema.name,
            expected,
            found: header_len,
            line: 1,
        });
    }

    let mut records = Vec::new();
    let mut malformed_skipped = 0;

    for result in rdr.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if schema.skip_malformed && !matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                debug!(source = schema.name, error = %e, "Skipping unreadable row");
                malformed_skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let found = record.len();
        if found != expected {
            if !schema.skip_malformed {
                return Err(PipelineError::SchemaMismatch {
                    source_name: schema.name,
                    expected,
                    found,
                    line,
                });
            }
            if found > expected {
                debug!(source = schema.name, line, found, expected, "Skipping malformed row");
                malformed_skipped += 1;
                continue;
            }
            debug!(source = schema.name, line, found, expected, "Padding short row");
        }

        let mut fields: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!cell.is_empty()).then(|| decode_latin1(cell)))
            .collect();
        fields.resize(expected, None);
        records.push(RawRecord::new(line, fields));
    }

    Ok(RawTable {
        schema,
        records,
        malformed_skipped,
    })
}

/// Booking.com row with its columns named.
struct BookingRow<'a> {
    hotel_name: Option<&'a str>,
    location: Option<&'a str>,
    rating: Option<&'a str>,
    review_score: Option<&'a str>,
    num_reviews: Option<&'a str>,
    room_score: Option<&'a str>,
    room_type: Option<&'a str>,
    bed_type: Option<&'a str>,
    price_bdt: Option<&'a str>,
}

impl<'a> BookingRow<'a> {
    fn rename(raw: &'a RawRecord) -> Result<Self, PipelineError> {
        check_width(raw, &BOOKING_SCHEMA)?;
        Ok(Self {
            hotel_name: raw.get(0),
            location: raw.get(1),
            rating: raw.get(2),
            review_score: raw.get(3),
            num_reviews: raw.get(4),
            room_score: raw.get(5),
            room_type: raw.get(6),
            bed_type: raw.get(7),
            price_bdt: raw.get(8),
        })
    }
}

/// TripAdvisor row with its columns named.
struct ReviewRow<'a> {
    hotel_name: Option<&'a str>,
    price_bdt: Option<&'a str>,
    num_reviews: Option<&'a str>,
    comment: Option<&'a str>,
}

impl<'a> ReviewRow<'a> {
    fn rename(raw: &'a RawRecord) -> Result<Self, PipelineError> {
        check_width(raw, &TRIPADVISOR_SCHEMA)?;
        Ok(Self {
            hotel_name: raw.get(0),
            price_bdt: raw.get(1),
            num_reviews: raw.get(2),
            comment: raw.get(3),
        })
    }
}

fn check_width(raw: &RawRecord, schema: &SourceSchema) -> Result<(), PipelineError> {
    if raw.len() != schema.columns.len() {
        return Err(PipelineError::SchemaMismatch {
            source_name: schema.name,
            expected: schema.columns.len(),
            found: raw.len(),
            line: raw.line,
        });
    }
    Ok(())
}

/// Returns `(price_bdt, price_eur)` for a raw price cell.
fn convert_price(raw: Option<&str>, config: &CleaningConfig) -> (Option<f64>, Option<f64>) {
    let price_bdt = parse_currency(raw).map(|p| p as f64);
    let price_eur = price_bdt.map(|p| round2(p / config.bdt_per_eur));
    (price_bdt, price_eur)
}

fn clean_booking_row(
    raw: &RawRecord,
    config: &CleaningConfig,
) -> Result<RowOutcome<CleanedHotelRecord>, PipelineError> {
    let row = BookingRow::rename(raw)?;

    let (price_bdt, price_eur) = convert_price(row.price_bdt, config);
    let num_reviews = parse_count(row.num_reviews);
    let rating = parse_decimal(row.rating);
    let room_score = parse_decimal(row.room_score).filter(|s| (0.0..=10.0).contains(s));

    let hotel_name = trim_text(row.hotel_name).filter(|n| !n.is_empty());
    let location = trim_text(row.location);
    let review_score = trim_text(row.review_score).map(ReviewLabel::from);
    let room_type = trim_text(row.room_type);
    let bed_type = trim_text(row.bed_type);

    let room_category = RoomCategory::classify(room_type.as_deref());

    let (Some(rating), Some(price_bdt), Some(price_eur)) = (rating, price_bdt, price_eur) else {
        return Ok(RowOutcome::MissingRequired);
    };
    if !config.price_in_band(price_eur) {
        return Ok(RowOutcome::OutOfBand);
    }
    let Some(hotel_name) = hotel_name else {
        return Ok(RowOutcome::BlankName);
    };

    Ok(RowOutcome::Kept(CleanedHotelRecord {
        hotel_name,
        location,
        rating,
        review_score,
        num_reviews,
        room_score,
        room_type,
        bed_type,
        price_bdt,
        price_eur,
        source: BOOKING_SOURCE.to_string(),
        room_category,
    }))
}

fn clean_review_row(
    raw: &RawRecord,
    config: &CleaningConfig,
) -> Result<RowOutcome<CleanedReviewRecord>, PipelineError> {
    let row = ReviewRow::rename(raw)?;

    let (price_bdt, price_eur) = convert_price(row.price_bdt, config);
    let num_reviews = parse_count(row.num_reviews);

    let hotel_name = strip_ordinal_prefix(row.hotel_name).filter(|n| !n.is_empty());
    let comment = trim_text(row.comment);

    let (Some(price_bdt), Some(price_eur)) = (price_bdt, price_eur) else {
        return Ok(RowOutcome::MissingRequired);
    };
    if !config.price_in_band(price_eur) {
        return Ok(RowOutcome::OutOfBand);
    }
    let Some(hotel_name) = hotel_name else {
        return Ok(RowOutcome::BlankName);
    };

    Ok(RowOutcome::Kept(CleanedReviewRecord {
        hotel_name,
        price_bdt,
        price_eur,
        num_reviews,
        comment,
        source: TRIPADVISOR_SOURCE.to_string(),
    }))
}

fn clean_table<T>(
    table: &RawTable,
    config: &CleaningConfig,
    clean_row: fn(&RawRecord, &CleaningConfig) -> Result<RowOutcome<T>, PipelineError>,
) -> Result<CleanedDataset<T>, PipelineError> {
    let mut summary = CleaningSummary {
        source: table.schema.name.to_string(),
        rows_read: table.records.len() + table.malformed_skipped,
        malformed_skipped: table.malformed_skipped,
        ..Default::default()
    };
    let mut records = Vec::with_capacity(table.records.len());

    for raw in &table.records {
        match clean_row(raw, config)? {
            RowOutcome::Kept(record) => records.push(record),
            RowOutcome::MissingRequired => summary.dropped_missing_required += 1,
            RowOutcome::OutOfBand => summary.dropped_out_of_band += 1,
            RowOutcome::BlankName => summary.dropped_blank_name += 1,
        }
    }
    summary.retained = records.len();

    info!(
        source = %summary.source,
        rows_read = summary.rows_read,
        malformed_skipped = summary.malformed_skipped,
        dropped_missing_required = summary.dropped_missing_required,
        dropped_out_of_band = summary.dropped_out_of_band,
        dropped_blank_name = summary.dropped_blank_name,
        retained = summary.retained,
        "Source cleaned"
    );

    Ok(CleanedDataset { records, summary })
}

/// Cleans a Booking.com table.
pub fn clean_booking(
    table: &RawTable,
    config: &CleaningConfig,
) -> Result<CleanedDataset<CleanedHotelRecord>, PipelineError> {
    clean_table(table, config, clean_booking_row)
}

/// Cleans a TripAdvisor table.
pub fn clean_tripadvisor(
    table: &RawTable,
    config: &CleaningConfig,
) -> Result<CleanedDataset<CleanedReviewRecord>, PipelineError> {
    clean_table(table, config, clean_review_row)
}

#[tracing::instrument(skip(config), fields(path = %path.display()))]
pub fn clean_booking_file(
    path: &Path,
    config: &CleaningConfig,
) -> Result<CleanedDataset<CleanedHotelRecord>, PipelineError> {
    let table = read_raw_records(path, &BOOKING_SCHEMA)?;
    clean_booking(&table, config)
}

#[tracing::instrument(skip(config), fields(path = %path.display()))]
pub fn clean_tripadvisor_file(
    path: &Path,
    config: &CleaningConfig,
) -> Result<CleanedDataset<CleanedReviewRecord>, PipelineError> {
    let table = read_raw_records(path, &TRIPADVISOR_SCHEMA)?;
    clean_tripadvisor(&table, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING_HEADER: &str =
        "Hotel,Location,Rating,Score,Reviews,Room score,Room,Bed,Price\n";
    const TRIPADVISOR_HEADER: &str = "Name,Price,Reviews,Comment\n";

    fn booking(rows: &str) -> CleanedDataset<CleanedHotelRecord> {
        let csv = format!("{BOOKING_HEADER}{rows}");
        let table = parse_raw_records(csv.as_bytes(), &BOOKING_SCHEMA).unwrap();
        clean_booking(&table, &CleaningConfig::default()).unwrap()
    }

    fn tripadvisor(rows: &str) -> CleanedDataset<CleanedReviewRecord> {
        let csv = format!("{TRIPADVISOR_HEADER}{rows}");
        let table = parse_raw_records(csv.as_bytes(), &TRIPADVISOR_SCHEMA).unwrap();
        clean_tripadvisor(&table, &CleaningConfig::default()).unwrap()
    }

    #[test]
    fn test_tripadvisor_row_end_to_end() {
        let dataset = tripadvisor("\" 1. Grand Hotel \",\"৳ 12,000\",\"1,234\",\" great stay \"\n");
        let record = &dataset.records()[0];

        assert_eq!(record.hotel_name, "Grand Hotel");
        assert_eq!(record.price_bdt, 12000.0);
        assert_eq!(record.price_eur, 100.0);
        assert_eq!(record.num_reviews, Some(1234));
        assert_eq!(record.comment.as_deref(), Some("great stay"));
        assert_eq!(record.source, TRIPADVISOR_SOURCE);
    }

    #[test]
    fn test_booking_row_fields() {
        let dataset = booking(
            " Sea Pearl ,  Cox's Bazar ,8.6, Fabulous ,\"2,310\",9.1,Deluxe Suite Room, 1 king bed ,\"BDT 24,000\"\n",
        );
        let record = &dataset.records()[0];

        assert_eq!(record.hotel_name, "Sea Pearl");
        assert_eq!(record.location.as_deref(), Some("Cox's Bazar"));
        assert_eq!(record.rating, 8.6);
        assert_eq!(record.review_score, Some(ReviewLabel::Fabulous));
        assert_eq!(record.num_reviews, Some(2310));
        assert_eq!(record.room_score, Some(9.1));
        assert_eq!(record.bed_type.as_deref(), Some("1 king bed"));
        assert_eq!(record.price_eur, 200.0);
        assert_eq!(record.room_category, RoomCategory::Suite);
        assert_eq!(record.source, BOOKING_SOURCE);
    }

    #[test]
    fn test_booking_drops_missing_rating_and_price() {
        let dataset = booking(concat!(
            "A,Dhaka,n/a,Good,10,8,Twin,bed,6000\n",
            "B,Dhaka,8.0,Good,10,8,Twin,bed,call us\n",
            "C,Dhaka,8.0,Good,10,8,Twin,bed,6000\n",
        ));

        assert_eq!(dataset.records().len(), 1);
        assert_eq!(dataset.records()[0].hotel_name, "C");
        assert_eq!(dataset.summary().dropped_missing_required, 2);
    }

    #[test]
    fn test_booking_keeps_rows_missing_optional_fields() {
        let dataset = booking("A,,8.0,,,,,,6000\n");
        let record = &dataset.records()[0];

        assert_eq!(record.num_reviews, None);
        assert_eq!(record.room_score, None);
        assert_eq!(record.review_score, None);
        assert_eq!(record.room_category, RoomCategory::Other);
    }

    #[test]
    fn test_room_score_outside_scale_becomes_missing() {
        let dataset = booking("A,Dhaka,8.0,Good,10,11.5,Twin,bed,6000\n");
        assert_eq!(dataset.records()[0].room_score, None);
    }

    #[test]
    fn test_price_band_boundaries() {
        // 600 BDT = 5.00 EUR, 1,200,000 BDT = 10,000.00 EUR
        let dataset = tripadvisor(concat!(
            "Low,599,1,x\n",
            "Floor,600,1,x\n",
            "Ceiling,\"1,200,000\",1,x\n",
            "High,\"1,200,120\",1,x\n",
        ));
        let names: Vec<_> = dataset.records().iter().map(|r| r.hotel_name.as_str()).collect();

        assert_eq!(names, vec!["Floor", "Ceiling"]);
        assert_eq!(dataset.summary().dropped_out_of_band, 2);
    }

    #[test]
    fn test_price_eur_is_derived_from_price_bdt() {
        let dataset = tripadvisor("A,1000,1,x\nB,\"7,777\",1,x\n");
        for record in dataset.records() {
            assert_eq!(record.price_eur, round2(record.price_bdt / 120.0));
        }
        assert_eq!(dataset.records()[0].price_eur, 8.33);
    }

    #[test]
    fn test_tripadvisor_skips_over_wide_rows_and_pads_short_ones() {
        let dataset = tripadvisor(concat!(
            "1. Good,6000,5,nice\n",
            "2. Broken,6000,5,nice,extra\n",
            "3. Short,6000\n",
            "4. Fine,7200,,\n",
        ));
        let names: Vec<_> = dataset.records().iter().map(|r| r.hotel_name.as_str()).collect();

        assert_eq!(names, vec!["Good", "Short", "Fine"]);
        assert_eq!(dataset.summary().malformed_skipped, 1);
        assert_eq!(dataset.summary().rows_read, 4);
        assert_eq!(dataset.records()[1].num_reviews, None);
        assert_eq!(dataset.records()[2].comment, None);
    }

    #[test]
    fn test_tripadvisor_short_row_keeps_leading_fields() {
        let dataset = tripadvisor("1. Short Hotel,6000,12\n");

        assert_eq!(dataset.records().len(), 1);
        assert_eq!(dataset.summary().malformed_skipped, 0);
        let record = &dataset.records()[0];
        assert_eq!(record.hotel_name, "Short Hotel");
        assert_eq!(record.price_eur, 50.0);
        assert_eq!(record.num_reviews, Some(12));
        assert_eq!(record.comment, None);
    }

    #[test]
    fn test_tripadvisor_short_row_without_price_is_dropped() {
        let dataset = tripadvisor("1. No Price\n");

        assert!(dataset.records().is_empty());
        assert_eq!(dataset.summary().dropped_missing_required, 1);
        assert_eq!(dataset.summary().malformed_skipped, 0);
    }

    #[test]
    fn test_blank_names_are_counted_separately() {
        let dataset = booking(concat!(
            "  ,Dhaka,8.0,Good,10,8,Twin,bed,6000\n",
            ",Dhaka,n/a,Good,10,8,Twin,bed,6000\n",
            ",Dhaka,8.0,Good,10,8,Twin,bed,300\n",
            "Named,Dhaka,8.0,Good,10,8,Twin,bed,6000\n",
        ));
        let summary = dataset.summary();

        assert_eq!(summary.retained, 1);
        assert_eq!(summary.dropped_blank_name, 1);
        assert_eq!(summary.dropped_missing_required, 1);
        assert_eq!(summary.dropped_out_of_band, 1);

        let reviews = tripadvisor("\"7. \",6000,5,x\n");
        assert_eq!(reviews.summary().dropped_blank_name, 1);
    }

    #[test]
    fn test_booking_row_width_mismatch_is_fatal() {
        let csv = format!("{BOOKING_HEADER}A,Dhaka,8.0\n");
        let err = parse_raw_records(csv.as_bytes(), &BOOKING_SCHEMA).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SchemaMismatch {
                expected: 9,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_header_width_mismatch_is_fatal() {
        let csv = "Name,Price,Reviews\nA,6000,1\n";
        let err = parse_raw_records(csv.as_bytes(), &TRIPADVISOR_SCHEMA).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SchemaMismatch { line: 1, .. }
        ));
    }

    #[test]
    fn test_hand_built_record_of_wrong_width_is_rejected() {
        let table = RawTable {
            schema: &BOOKING_SCHEMA,
            records: vec![RawRecord::new(2, vec![Some("A".to_string())])],
            malformed_skipped: 0,
        };
        assert!(clean_booking(&table, &CleaningConfig::default()).is_err());
    }

    #[test]
    fn test_missing_source_file() {
        let err = read_raw_records(Path::new("/nonexistent/booking.csv"), &BOOKING_SCHEMA)
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceMissing { .. }));
    }

    #[test]
    fn test_non_utf8_bytes_are_tolerated() {
        let mut csv = TRIPADVISOR_HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"Caf\xe9 Inn,6000,3,tr\xe8s bien\n");
        let table = parse_raw_records(csv.as_slice(), &TRIPADVISOR_SCHEMA).unwrap();
        let dataset = clean_tripadvisor(&table, &CleaningConfig::default()).unwrap();

        assert_eq!(dataset.records()[0].hotel_name, "Café Inn");
        assert_eq!(dataset.records()[0].comment.as_deref(), Some("très bien"));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let rows = "1. A,6000,5,ok\n2. B,abc,5,ok\n3. C,9000,,\n";
        let first = tripadvisor(rows);
        let second = tripadvisor(rows);
        assert_eq!(first.records(), second.records());
        assert_eq!(first.summary(), second.summary());
    }
}
