//! Trip log errors

use thiserror::Error;

/// Errors reading or writing trip logs
#[derive(Error, Debug)]
pub enum DatalogError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cell could not be converted to a sample value
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line in the file
        line: u64,
        /// What was wrong
        message: String,
    },

    /// None of the accepted time headers is present
    #[error("No time column found (expected one of: {0})")]
    MissingTimeColumn(String),

    /// Malformed CSV (bad quoting, invalid UTF-8)
    #[error("Invalid trip CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON or wrong shape
    #[error("Invalid trip JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Header only, or no rows at all
    #[error("Trip log contains no samples")]
    Empty,

    /// Extension is neither `.csv` nor `.json`
    #[error("Unknown trip log format: {0}")]
    UnknownFormat(String),
}
