//! Sampler errors

use thiserror::Error;

/// Precondition violations raised by the sampler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// No samples to search
    #[error("Sample sequence is empty")]
    EmptySequence,

    /// Two numeric points share a timestamp
    #[error("Degenerate interpolation interval: both points at t={time}s")]
    DegenerateInterval {
        /// The shared timestamp (s)
        time: f64,
    },
}
