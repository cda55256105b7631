//! Bar ingestion from CSV.
//!
//! Expected header: `timestamp,open,high,low,close[,volume]`.
//! Timestamps may be `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or
//! `YYYY-MM-DDTHH:MM:SS`. Rows must be strictly increasing in time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::Bar;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognised timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: timestamp {timestamp} is not after the previous bar ({previous})")]
    NonIncreasingTimestamp {
        row: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },

    #[error("input contains no bars")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Parse a timestamp cell. Bare dates map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Read bars from any CSV source.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars: Vec<Bar> = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        // 1-based data rows, header excluded
        let row = i + 1;
        let raw = record?;
        let timestamp =
            parse_timestamp(&raw.timestamp).ok_or_else(|| DataError::InvalidTimestamp {
                row,
                value: raw.timestamp.clone(),
            })?;

        if let Some(prev) = bars.last() {
            if timestamp <= prev.timestamp {
                return Err(DataError::NonIncreasingTimestamp {
                    row,
                    timestamp,
                    previous: prev.timestamp,
                });
            }
        }

        bars.push(Bar {
            timestamp,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
        });
    }

    if bars.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(bars)
}

/// Read bars from a CSV file on disk.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_bars_csv(std::io::BufReader::new(file))
}
