//! Trip log formats

use std::path::Path;

use super::DatalogError;
use crate::trip::Sample;

/// Supported trip log formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Comma-separated values, one row per sample
    Csv,
    /// Array of sample objects
    Json,
}

impl LogFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(LogFormat::Csv),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Csv => "csv",
            LogFormat::Json => "json",
        }
    }
}

/// Write samples to a CSV file
pub fn write_csv<P: AsRef<Path>>(path: P, samples: &[Sample]) -> Result<(), DatalogError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Time"];
    header.extend(Sample::SIGNAL_NAMES);
    writer.write_record(&header)?;

    for sample in samples {
        let mut row = Vec::with_capacity(header.len());
        row.push(format!("{:.3}", sample.time));
        for name in Sample::SIGNAL_NAMES {
            row.push(format!("{:.4}", sample.signal(name).unwrap_or_default()));
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            LogFormat::from_extension(Path::new("trip.csv")),
            Some(LogFormat::Csv)
        );
        assert_eq!(
            LogFormat::from_extension(Path::new("trip.JSON")),
            Some(LogFormat::Json)
        );
        assert_eq!(LogFormat::from_extension(Path::new("trip.txt")), None);
        assert_eq!(LogFormat::from_extension(Path::new("trip")), None);
    }
}
