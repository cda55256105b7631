//! Per-bar output export — CSV and JSON.
//!
//! CSV columns: bar_index, timestamp, source, sample_count, basis, upper1,
//! lower1, upper2, lower2, trend, phase, entry_price, stop_loss, take_profit,
//! swing_low, swing_high, transitions. Unset values are empty cells; set
//! values use the shortest text that parses back to the same `f64`.

use std::io::Write;

use crate::data::DataError;
use crate::pipeline::BarOutput;

pub const CSV_HEADER: [&str; 17] = [
    "bar_index",
    "timestamp",
    "source",
    "sample_count",
    "basis",
    "upper1",
    "lower1",
    "upper2",
    "lower2",
    "trend",
    "phase",
    "entry_price",
    "stop_loss",
    "take_profit",
    "swing_low",
    "swing_high",
    "transitions",
];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write outputs as CSV with a header row.
pub fn outputs_to_csv<W: Write>(writer: W, outputs: &[BarOutput]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for o in outputs {
        let b = o.bands;
        wtr.write_record([
            o.bar_index.to_string(),
            o.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            cell(o.source),
            o.sample_count.to_string(),
            cell(b.map(|b| b.basis)),
            cell(b.map(|b| b.upper1)),
            cell(b.map(|b| b.lower1)),
            cell(b.map(|b| b.upper2)),
            cell(b.map(|b| b.lower2)),
            o.trend.map(|t| t.as_str().to_string()).unwrap_or_default(),
            o.phase.as_str().to_string(),
            cell(o.entry_price),
            cell(o.stop_loss),
            cell(o.take_profit),
            cell(o.swing_low),
            cell(o.swing_high),
            o.transitions.label(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write outputs as a pretty-printed JSON array.
pub fn outputs_to_json<W: Write>(writer: W, outputs: &[BarOutput]) -> Result<(), DataError> {
    serde_json::to_writer_pretty(writer, outputs)?;
    Ok(())
}
