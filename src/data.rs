//! Sales history ingestion: CSV parsing and validation

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// One historical (month, product, quantity) data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar month of the sales record, day pinned to the first
    pub month: NaiveDate,
    /// Product identifier
    pub product: String,
    /// Quantity sold; any finite number is admitted
    pub quantity: f64,
}

/// Loader for sales history CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV file on disk.
    ///
    /// The file is read fully in one scoped pass and handed to [`parse_csv`].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let text = fs::read_to_string(path)?;
        parse_csv(&text)
    }
}

/// Parse raw CSV text into validated observations.
///
/// The first row is treated as a header and skipped without inspection.
/// Fields are comma-separated, optionally double-quoted, and trimmed. A row
/// is dropped (not fatal) when its date is not a real `YYYY-MM` month, its
/// quantity is not a finite number, or its product field parses as a number
/// (the sign of a column-shifted row). Surviving rows keep their input order;
/// the call only fails when nothing survives.
pub fn parse_csv(text: &str) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "dropping unreadable row");
                continue;
            }
        };
        match parse_record(&record) {
            Some(observation) => observations.push(observation),
            None => debug!(?record, "dropping invalid row"),
        }
    }

    if observations.is_empty() {
        return Err(ForecastError::Parse("no valid data".to_string()));
    }
    Ok(observations)
}

/// Validate one record into an observation, or `None` to drop the row
fn parse_record(record: &csv::StringRecord) -> Option<Observation> {
    let date = record.get(0)?;
    let product = record.get(1)?;
    let quantity = record.get(2)?;

    let month = parse_month(date)?;

    // A numeric product means the columns slipped
    if product.parse::<f64>().is_ok() {
        return None;
    }

    let quantity: f64 = quantity.parse().ok()?;
    if !quantity.is_finite() {
        return None;
    }

    Some(Observation {
        month,
        product: product.to_string(),
        quantity,
    })
}

/// Accept exactly `YYYY-MM` naming a real month, normalized to its first day
fn parse_month(field: &str) -> Option<NaiveDate> {
    let bytes = field.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return None;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) || !bytes[5..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{field}-01"), "%Y-%m-%d").ok()
}

/// Latest month present in the observation set
pub fn last_observed_month(observations: &[Observation]) -> Option<NaiveDate> {
    observations.iter().map(|observation| observation.month).max()
}
