//! Named signal series

use super::{interpolate_at, DataPoint, SamplerError, SignalValue};

/// A named, time-sorted series of raw data points
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    name: String,
    points: Vec<DataPoint>,
}

impl SignalSeries {
    /// Create a series. Points are sorted by time (stable).
    pub fn new(name: impl Into<String>, mut points: Vec<DataPoint>) -> Self {
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            name: name.into(),
            points,
        }
    }

    /// Signal name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All points
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `time`, interpolated between bracketing points
    pub fn value_at(&self, time: f64) -> Result<SignalValue, SamplerError> {
        interpolate_at(&self.points, time)
    }

    /// Points inside an inclusive time window
    pub fn range(&self, start: f64, end: f64) -> &[DataPoint] {
        let lo = self.points.partition_point(|p| p.time < start);
        let hi = self.points.partition_point(|p| p.time <= end);
        if lo >= hi {
            return &[];
        }
        &self.points[lo..hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series() -> SignalSeries {
        SignalSeries::new(
            "vehicle_speed",
            vec![
                DataPoint::new(2.0, 30.0),
                DataPoint::new(0.0, 10.0),
                DataPoint::new(1.0, 20.0),
            ],
        )
    }

    #[test]
    fn test_points_sorted() {
        let series = make_series();
        let times: Vec<f64> = series.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_value_at() {
        let series = make_series();
        assert_eq!(series.value_at(0.5).unwrap(), SignalValue::Number(15.0));
    }

    #[test]
    fn test_range() {
        let series = make_series();
        assert_eq!(series.range(0.5, 2.0).len(), 2);
        assert_eq!(series.range(0.0, 0.0).len(), 1);
        assert!(series.range(5.0, 6.0).is_empty());
        assert!(series.range(2.0, 1.0).is_empty());
    }
}
