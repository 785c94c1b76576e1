//! Trip data validation
//!
//! Checks a trip for problems that would make playback misleading: broken
//! time ordering, non-finite values and impossible collision margins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trip::Sample;

/// Problems that make a trip unusable for playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ValidationError {
    /// Nothing to play
    #[error("Trip has no samples")]
    EmptyTrip,

    /// Time is NaN or infinite
    #[error("Sample {index} has non-finite time")]
    NonFiniteTime {
        /// Sample index
        index: usize,
    },

    /// Time went backwards
    #[error("Sample {index} at t={time}s is earlier than the previous sample at t={previous}s")]
    NonMonotonicTime {
        /// Sample index
        index: usize,
        /// Time of the last finite sample before it (s)
        previous: f64,
        /// Time of this sample (s)
        time: f64,
    },
}

/// Suspicious values that playback tolerates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationWarning {
    /// Signal value is NaN or infinite
    NonFiniteValue {
        /// Sample index
        index: usize,
        /// Canonical signal name
        signal: String,
    },
    /// Collision margin below zero
    NegativeMargin {
        /// Sample index
        index: usize,
        /// Offending margin (m)
        margin: f64,
    },
}

impl ValidationWarning {
    /// Name of the affected signal
    pub fn signal(&self) -> &str {
        match self {
            ValidationWarning::NonFiniteValue { signal, .. } => signal,
            ValidationWarning::NegativeMargin { .. } => "collision_margin",
        }
    }
}

/// Per-signal outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCheck {
    /// Canonical signal name
    pub name: String,
    /// No warnings were raised for this signal
    pub valid: bool,
    /// Number of warnings raised for this signal
    pub issue_count: usize,
}

/// Complete validation report for a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Problems that prevent meaningful playback
    pub errors: Vec<ValidationError>,
    /// Tolerated problems
    pub warnings: Vec<ValidationWarning>,
    /// One entry per signal in [`Sample::SIGNAL_NAMES`] order
    pub signals: Vec<SignalCheck>,
    /// Number of samples checked
    pub sample_count: usize,
}

impl ValidationReport {
    /// Returns true if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns true if the trip is usable (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Number of signals without warnings
    pub fn valid_signals(&self) -> usize {
        self.signals.iter().filter(|s| s.valid).count()
    }

    /// Fraction of signals without warnings, 0 when there are none
    pub fn validation_rate(&self) -> f64 {
        if self.signals.is_empty() {
            0.0
        } else {
            self.valid_signals() as f64 / self.signals.len() as f64
        }
    }
}

/// Validate samples. An empty trip marks every signal invalid.
pub fn validate_samples(samples: &[Sample]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if samples.is_empty() {
        errors.push(ValidationError::EmptyTrip);
    }

    let mut previous: Option<f64> = None;
    for (index, sample) in samples.iter().enumerate() {
        if !sample.time.is_finite() {
            errors.push(ValidationError::NonFiniteTime { index });
        } else {
            if let Some(prev) = previous.filter(|prev| sample.time < *prev) {
                errors.push(ValidationError::NonMonotonicTime {
                    index,
                    previous: prev,
                    time: sample.time,
                });
            }
            previous = Some(sample.time);
        }

        for name in Sample::SIGNAL_NAMES {
            if !sample.signal(name).is_some_and(f64::is_finite) {
                warnings.push(ValidationWarning::NonFiniteValue {
                    index,
                    signal: name.to_string(),
                });
            }
        }
        if sample.collision_margin < 0.0 {
            warnings.push(ValidationWarning::NegativeMargin {
                index,
                margin: sample.collision_margin,
            });
        }
    }

    let signals = Sample::SIGNAL_NAMES
        .iter()
        .map(|&name| {
            let issue_count = warnings.iter().filter(|w| w.signal() == name).count();
            SignalCheck {
                name: name.to_string(),
                valid: !samples.is_empty() && issue_count == 0,
                issue_count,
            }
        })
        .collect();

    if !errors.is_empty() || !warnings.is_empty() {
        tracing::warn!(
            "Trip validation: {} errors, {} warnings over {} samples",
            errors.len(),
            warnings.len(),
            samples.len()
        );
    }

    ValidationReport {
        errors,
        warnings,
        signals,
        sample_count: samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_trip_is_valid() {
        let samples: Vec<Sample> = (0..5)
            .map(|i| Sample::at(i as f64 * 0.1).with_margin(3.0))
            .collect();
        let report = validate_samples(&samples);
        assert!(report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.valid_signals(), Sample::SIGNAL_NAMES.len());
        assert_eq!(report.validation_rate(), 1.0);
    }

    #[test]
    fn test_empty_trip() {
        let report = validate_samples(&[]);
        assert_eq!(report.errors, vec![ValidationError::EmptyTrip]);
        assert_eq!(report.valid_signals(), 0);
        assert_eq!(report.validation_rate(), 0.0);
    }

    #[test]
    fn test_time_errors() {
        let samples = vec![Sample::at(0.0), Sample::at(0.2), Sample::at(0.1), Sample::at(f64::NAN)];
        let report = validate_samples(&samples);
        assert_eq!(
            report.errors,
            vec![
                ValidationError::NonMonotonicTime {
                    index: 2,
                    previous: 0.2,
                    time: 0.1
                },
                ValidationError::NonFiniteTime { index: 3 },
            ]
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn test_value_warnings() {
        let mut samples = vec![Sample::at(0.0).with_margin(-0.3), Sample::at(0.1)];
        samples[1].vehicle_speed = f64::INFINITY;
        let report = validate_samples(&samples);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);

        let speed = report.signals.iter().find(|s| s.name == "vehicle_speed").unwrap();
        assert!(!speed.valid);
        assert_eq!(speed.issue_count, 1);
        let margin = report.signals.iter().find(|s| s.name == "collision_margin").unwrap();
        assert!(!margin.valid);
        assert_eq!(report.valid_signals(), Sample::SIGNAL_NAMES.len() - 2);
    }
}
