//! Signal interpolation between raw data points

use serde::{Deserialize, Serialize};

use super::SamplerError;

/// Raw value of a signal at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Interpolated linearly
    Number(f64),
    /// Held from the earlier point
    Bool(bool),
    /// Held from the earlier point
    Text(String),
}

impl SignalValue {
    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for SignalValue {
    fn from(v: f64) -> Self {
        SignalValue::Number(v)
    }
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        SignalValue::Bool(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::Text(v.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(v: String) -> Self {
        SignalValue::Text(v)
    }
}

/// A timestamped raw value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Seconds from trip start
    pub time: f64,
    /// Raw value
    pub value: SignalValue,
}

impl DataPoint {
    /// Create a new data point
    pub fn new(time: f64, value: impl Into<SignalValue>) -> Self {
        Self {
            time,
            value: value.into(),
        }
    }
}

/// Linearly interpolate between two bracketing points.
///
/// Non-numeric values are never interpolated: the `before` value is
/// returned as is. Two numeric points sharing a timestamp are rejected with
/// [`SamplerError::DegenerateInterval`].
pub fn interpolate(
    before: &DataPoint,
    after: &DataPoint,
    query_time: f64,
) -> Result<SignalValue, SamplerError> {
    let (SignalValue::Number(v0), SignalValue::Number(v1)) = (&before.value, &after.value) else {
        return Ok(before.value.clone());
    };
    if before.time == after.time {
        return Err(SamplerError::DegenerateInterval { time: before.time });
    }
    let ratio = (query_time - before.time) / (after.time - before.time);
    Ok(SignalValue::Number(v0 + (v1 - v0) * ratio))
}

/// Value of a time-sorted series at `query_time`.
///
/// - exact timestamp hit: that point's value
/// - between two points: [`interpolate`]
/// - before the first or after the last point: the edge value, unmodified
pub fn interpolate_at(points: &[DataPoint], query_time: f64) -> Result<SignalValue, SamplerError> {
    if points.is_empty() {
        return Err(SamplerError::EmptySequence);
    }
    // Number of points at or before the query time
    let split = points.partition_point(|p| p.time <= query_time);
    let before = split.checked_sub(1).map(|i| &points[i]);
    let after = points.get(split);

    match (before, after) {
        (Some(b), _) if b.time == query_time => Ok(b.value.clone()),
        (Some(b), Some(a)) => match interpolate(b, a, query_time) {
            Err(SamplerError::DegenerateInterval { .. }) => Ok(b.value.clone()),
            other => other,
        },
        (Some(b), None) => Ok(b.value.clone()),
        (None, Some(a)) => Ok(a.value.clone()),
        (None, None) => Err(SamplerError::EmptySequence),
    }
}
