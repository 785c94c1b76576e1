//! Trip log readers

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::DatalogError;
use crate::trip::Sample;

/// Accepted time column headers, in priority order
pub const TIME_COLUMNS: [&str; 6] = ["time", "timestamp", "Time", "Timestamp", "t", "T"];

/// Header spellings accepted for each signal
const SIGNAL_COLUMNS: [(&str, &[&str]); 8] = [
    ("vehicle_speed", &["vehicle_speed", "vehicleSpeed", "speed"]),
    ("acceleration", &["acceleration"]),
    ("steering_angle", &["steering_angle", "steeringAngle"]),
    ("position_x", &["position_x", "positionX", "x"]),
    ("position_y", &["position_y", "positionY", "y"]),
    ("collision_margin", &["collision_margin", "collisionMargin"]),
    ("planned_path_x", &["planned_path_x", "plannedPathX"]),
    ("planned_path_y", &["planned_path_y", "plannedPathY"]),
];

fn parse_cell(cell: &str, line: u64, column: &str) -> Result<f64, DatalogError> {
    cell.parse::<f64>().map_err(|_| DatalogError::Parse {
        line,
        message: format!("invalid number '{}' in column '{}'", cell, column),
    })
}

/// Parse CSV text into samples.
///
/// The first row is the header. Quoted cells may contain commas; blank
/// lines are skipped. Columns that are missing, or cells that are empty,
/// leave the signal at 0.
pub fn parse_csv(content: &str) -> Result<Vec<Sample>, DatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader.headers()?.clone();
    if header.iter().all(str::is_empty) {
        return Err(DatalogError::Empty);
    }

    let time_idx = TIME_COLUMNS
        .iter()
        .find_map(|name| header.iter().position(|h| h == *name))
        .ok_or_else(|| DatalogError::MissingTimeColumn(TIME_COLUMNS.join(", ")))?;

    // (canonical signal name, column index)
    let columns: Vec<(&str, usize)> = SIGNAL_COLUMNS
        .iter()
        .filter_map(|(signal, aliases)| {
            aliases
                .iter()
                .find_map(|alias| header.iter().position(|h| h == *alias))
                .map(|idx| (*signal, idx))
        })
        .collect();

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line_no = record.position().map(|p| p.line()).unwrap_or_default();

        let time_cell = record.get(time_idx).unwrap_or("");
        if time_cell.is_empty() {
            return Err(DatalogError::Parse {
                line: line_no,
                message: "missing timestamp".into(),
            });
        }
        let time = parse_cell(time_cell, line_no, &header[time_idx])?;
        if !time.is_finite() {
            return Err(DatalogError::Parse {
                line: line_no,
                message: format!("non-finite timestamp '{}'", time_cell),
            });
        }

        let mut sample = Sample::at(time);
        for &(signal, idx) in &columns {
            let cell = record.get(idx).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            let value = parse_cell(cell, line_no, &header[idx])?;
            if let Some(slot) = sample.signal_mut(signal) {
                *slot = value;
            }
        }
        samples.push(sample);
    }

    finish(samples)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTrip {
    Bare(Vec<Sample>),
    Wrapped { samples: Vec<Sample> },
}

/// Parse JSON text into samples.
///
/// Accepts either an array of samples or an object with a `samples` array.
pub fn parse_json(content: &str) -> Result<Vec<Sample>, DatalogError> {
    let samples = match serde_json::from_str::<JsonTrip>(content)? {
        JsonTrip::Bare(samples) | JsonTrip::Wrapped { samples } => samples,
    };
    if let Some(bad) = samples.iter().position(|s| !s.time.is_finite()) {
        return Err(DatalogError::Parse {
            line: bad as u64 + 1,
            message: "non-finite timestamp".into(),
        });
    }
    finish(samples)
}

/// Read a CSV trip log
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, DatalogError> {
    parse_csv(&fs::read_to_string(path)?)
}

/// Read a JSON trip log
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, DatalogError> {
    parse_json(&fs::read_to_string(path)?)
}

/// Reject empty logs and put samples in time order
fn finish(mut samples: Vec<Sample>) -> Result<Vec<Sample>, DatalogError> {
    if samples.is_empty() {
        return Err(DatalogError::Empty);
    }
    if samples.windows(2).any(|w| w[1].time < w[0].time) {
        tracing::warn!("Trip samples out of time order, sorting {} samples", samples.len());
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
    Ok(samples)
}
