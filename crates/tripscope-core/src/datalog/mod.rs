//! Trip Data Logs
//!
//! Reads trip recordings from CSV or JSON and writes them back as CSV.

mod error;
mod format;
mod reader;

pub use error::DatalogError;
pub use format::{write_csv, LogFormat};
pub use reader::{parse_csv, parse_json, read_csv, read_json, TIME_COLUMNS};

use std::path::Path;

use crate::trip::Trip;

/// Load a trip, picking the reader from the file extension.
///
/// The trip is named after the file stem.
pub fn load_trip<P: AsRef<Path>>(path: P) -> Result<Trip, DatalogError> {
    let path = path.as_ref();
    let format = LogFormat::from_extension(path)
        .ok_or_else(|| DatalogError::UnknownFormat(path.display().to_string()))?;
    let samples = match format {
        LogFormat::Csv => read_csv(path)?,
        LogFormat::Json => read_json(path)?,
    };
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trip")
        .to_string();
    tracing::info!("Loaded trip '{}': {} samples ({:?})", name, samples.len(), format);
    Ok(Trip::new(name, samples))
}
