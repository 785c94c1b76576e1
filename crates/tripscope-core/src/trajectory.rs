//! Trajectory analysis
//!
//! Compares where the vehicle went against the planned path recorded with
//! each sample, and summarises speed and position ranges over a trip.

use serde::{Deserialize, Serialize};

use crate::trip::Sample;

/// Mean deviation below which path following counts as good (m)
pub const GOOD_MEAN_DEVIATION: f64 = 2.0;
/// Every n-th sample is analysed by [`analyze_deviation`]
pub const DEFAULT_DEVIATION_STRIDE: usize = 10;
/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

/// How closely the vehicle followed its planned path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathQuality {
    /// Mean deviation under [`GOOD_MEAN_DEVIATION`]
    Good,
    /// Mean deviation at or above [`GOOD_MEAN_DEVIATION`]
    NeedsAttention,
}

impl PathQuality {
    /// Rate a mean deviation in meters
    pub fn from_mean(mean_deviation: f64) -> Self {
        if mean_deviation < GOOD_MEAN_DEVIATION {
            PathQuality::Good
        } else {
            PathQuality::NeedsAttention
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PathQuality::Good => "good",
            PathQuality::NeedsAttention => "needs_attention",
        }
    }
}

/// Deviation at one analysed sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationPoint {
    /// Sample time (s)
    pub time: f64,
    /// Distance from the actual to the planned position (m)
    pub deviation: f64,
    /// Actual position (m)
    pub actual_x: f64,
    /// Actual position (m)
    pub actual_y: f64,
}

/// Actual vs planned path over a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryDeviation {
    /// Samples with a finite position
    pub total_points: usize,
    /// Samples that were analysed
    pub analyzed_points: usize,
    /// Largest deviation (m)
    pub max_deviation: f64,
    /// Mean deviation (m)
    pub mean_deviation: f64,
    /// Per-point deviations in time order
    pub points: Vec<DeviationPoint>,
    /// Rating of `mean_deviation`
    pub quality: PathQuality,
}

fn has_position(s: &Sample) -> bool {
    s.position_x.is_finite() && s.position_y.is_finite()
}

/// Distance between the actual and planned position of a sample
pub fn deviation_of(sample: &Sample) -> f64 {
    (sample.position_x - sample.planned_path_x).hypot(sample.position_y - sample.planned_path_y)
}

/// Measure path deviation on every `stride`-th sample with a valid position.
///
/// Samples whose planned point is not finite are skipped. Returns `None` when
/// nothing could be analysed.
pub fn analyze_deviation(samples: &[Sample], stride: usize) -> Option<TrajectoryDeviation> {
    let positioned: Vec<&Sample> = samples.iter().filter(|s| has_position(s)).collect();

    let points: Vec<DeviationPoint> = positioned
        .iter()
        .step_by(stride.max(1))
        .filter_map(|s| {
            let deviation = deviation_of(s);
            deviation.is_finite().then_some(DeviationPoint {
                time: s.time,
                deviation,
                actual_x: s.position_x,
                actual_y: s.position_y,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }

    let max_deviation = points.iter().map(|p| p.deviation).fold(0.0, f64::max);
    let mean_deviation = points.iter().map(|p| p.deviation).sum::<f64>() / points.len() as f64;
    let quality = PathQuality::from_mean(mean_deviation);
    tracing::debug!(
        "Path deviation over {} points: max {:.2}m, mean {:.2}m ({})",
        points.len(),
        max_deviation,
        mean_deviation,
        quality.as_str()
    );

    Some(TrajectoryDeviation {
        total_points: positioned.len(),
        analyzed_points: points.len(),
        max_deviation,
        mean_deviation,
        points,
        quality,
    })
}

/// Speed summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedStats {
    /// Highest speed (m/s)
    pub max_mps: f64,
    /// Lowest speed (m/s)
    pub min_mps: f64,
    /// Mean speed (m/s)
    pub mean_mps: f64,
    /// Highest speed (km/h)
    pub max_kmh: f64,
    /// Mean speed (km/h)
    pub mean_kmh: f64,
}

/// Bounding box of the driven positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRange {
    /// Smallest x (m)
    pub x_min: f64,
    /// Largest x (m)
    pub x_max: f64,
    /// Smallest y (m)
    pub y_min: f64,
    /// Largest y (m)
    pub y_max: f64,
}

impl PositionRange {
    /// Extent along x (m)
    pub fn x_range(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along y (m)
    pub fn y_range(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Trip-wide trajectory statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStats {
    /// Number of samples
    pub total_points: usize,
    /// Last minus first sample time (s)
    pub duration: f64,
    /// `None` when no sample has a finite speed
    pub speed: Option<SpeedStats>,
    /// `None` when no sample has a finite position
    pub position: Option<PositionRange>,
}

/// (min, max, sum, count) of the finite values
fn fold_finite(values: impl Iterator<Item = f64>) -> Option<(f64, f64, f64, usize)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v, v, 1)),
            Some((lo, hi, sum, n)) => Some((lo.min(v), hi.max(v), sum + v, n + 1)),
        })
}

/// Summarise speed and position over `samples`. Non-finite values are ignored.
pub fn trajectory_stats(samples: &[Sample]) -> TrajectoryStats {
    let duration = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.time - first.time,
        _ => 0.0,
    };

    let speed = fold_finite(samples.iter().map(|s| s.vehicle_speed)).map(|(min, max, sum, n)| {
        let mean = sum / n as f64;
        SpeedStats {
            max_mps: max,
            min_mps: min,
            mean_mps: mean,
            max_kmh: max * MPS_TO_KMH,
            mean_kmh: mean * MPS_TO_KMH,
        }
    });

    let positioned = || samples.iter().filter(|s| has_position(s));
    let position = fold_finite(positioned().map(|s| s.position_x))
        .zip(fold_finite(positioned().map(|s| s.position_y)))
        .map(|((x_min, x_max, ..), (y_min, y_max, ..))| PositionRange {
            x_min,
            x_max,
            y_min,
            y_max,
        });

    TrajectoryStats {
        total_points: samples.len(),
        duration,
        speed,
        position,
    }
}
