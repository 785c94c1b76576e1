//! Nearest-sample lookup
//!
//! The default policy returns the first sample within a 50 ms window of the
//! query time and falls back to the first sample of the trip otherwise. This
//! is not a nearest-neighbour search: when several samples lie outside the
//! window, the closest one is NOT chosen. Callers that need a true nearest
//! neighbour can plug in [`BinarySearchPolicy`].

use crate::trip::Sample;

use super::SamplerError;

/// Match window for [`TolerancePolicy`] (seconds)
pub const MATCH_TOLERANCE: f64 = 0.05;

/// Strategy for resolving the sample active at a query time
pub trait NearestSample: Send + Sync {
    /// Index of the resolved sample
    fn index_of(&self, samples: &[Sample], query_time: f64) -> Result<usize, SamplerError>;

    /// The resolved sample
    fn find<'a>(&self, samples: &'a [Sample], query_time: f64) -> Result<&'a Sample, SamplerError> {
        let index = self.index_of(samples, query_time)?;
        samples.get(index).ok_or(SamplerError::EmptySequence)
    }
}

/// First sample within `tolerance` of the query time, else index 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerancePolicy {
    tolerance: f64,
}

impl TolerancePolicy {
    /// Create a policy with a custom match window
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Match window in seconds
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self::new(MATCH_TOLERANCE)
    }
}

impl NearestSample for TolerancePolicy {
    fn index_of(&self, samples: &[Sample], query_time: f64) -> Result<usize, SamplerError> {
        if samples.is_empty() {
            return Err(SamplerError::EmptySequence);
        }
        Ok(samples
            .iter()
            .position(|s| (s.time - query_time).abs() < self.tolerance)
            .unwrap_or(0))
    }
}

/// True nearest neighbour over time-sorted samples.
///
/// Ties resolve to the earlier sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinarySearchPolicy;

impl NearestSample for BinarySearchPolicy {
    fn index_of(&self, samples: &[Sample], query_time: f64) -> Result<usize, SamplerError> {
        if samples.is_empty() {
            return Err(SamplerError::EmptySequence);
        }
        let after = samples.partition_point(|s| s.time < query_time);
        if after == 0 {
            return Ok(0);
        }
        if after == samples.len() {
            return Ok(samples.len() - 1);
        }
        let before = after - 1;
        let d_before = query_time - samples[before].time;
        let d_after = samples[after].time - query_time;
        Ok(if d_after < d_before { after } else { before })
    }
}

/// Resolve the sample for `query_time` with the default tolerance policy
pub fn find_nearest(samples: &[Sample], query_time: f64) -> Result<&Sample, SamplerError> {
    TolerancePolicy::default().find(samples, query_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(times: &[f64]) -> Vec<Sample> {
        times.iter().map(|&t| Sample::at(t)).collect()
    }

    #[test]
    fn test_exact_match() {
        let s = samples(&[0.0, 0.1, 0.2, 0.3]);
        assert_eq!(find_nearest(&s, 0.2).unwrap().time, 0.2);
    }

    #[test]
    fn test_within_tolerance() {
        let s = samples(&[0.0, 1.0, 2.0]);
        assert_eq!(find_nearest(&s, 1.04).unwrap().time, 1.0);
        assert_eq!(find_nearest(&s, 0.96).unwrap().time, 1.0);
    }

    #[test]
    fn test_falls_back_to_first_sample() {
        let s = samples(&[0.0, 10.0]);
        assert_eq!(find_nearest(&s, 5.0).unwrap().time, 0.0);
        // Closer to 10.0 than to 0.0, still index 0
        assert_eq!(find_nearest(&s, 9.0).unwrap().time, 0.0);
    }

    #[test]
    fn test_first_match_wins() {
        let s = samples(&[1.0, 1.02, 1.04]);
        assert_eq!(TolerancePolicy::default().index_of(&s, 1.039).unwrap(), 0);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(find_nearest(&[], 1.0), Err(SamplerError::EmptySequence));
        assert_eq!(
            BinarySearchPolicy.index_of(&[], 1.0),
            Err(SamplerError::EmptySequence)
        );
    }

    #[test]
    fn test_binary_search_nearest() {
        let s = samples(&[0.0, 10.0, 20.0]);
        let policy = BinarySearchPolicy;
        assert_eq!(policy.index_of(&s, 9.0).unwrap(), 1);
        assert_eq!(policy.index_of(&s, 4.0).unwrap(), 0);
        assert_eq!(policy.index_of(&s, 5.0).unwrap(), 0);
        assert_eq!(policy.index_of(&s, -3.0).unwrap(), 0);
        assert_eq!(policy.index_of(&s, 99.0).unwrap(), 2);
    }
}
