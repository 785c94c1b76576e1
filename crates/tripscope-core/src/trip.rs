//! Trip data model
//!
//! A trip is an immutable, time-ordered sequence of vehicle-state samples
//! shared between the loader, the sampler and the playback controller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sampler::{DataPoint, SignalSeries};
use crate::trajectory::{self, TrajectoryDeviation, TrajectoryStats, DEFAULT_DEVIATION_STRIDE};
use crate::validation::{self, ValidationReport};

/// One vehicle-state observation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Seconds from trip start
    #[serde(alias = "timestamp")]
    pub time: f64,
    /// Vehicle speed (m/s)
    #[serde(default, alias = "vehicle_speed", alias = "speed")]
    pub vehicle_speed: f64,
    /// Longitudinal acceleration (m/s²)
    #[serde(default)]
    pub acceleration: f64,
    /// Steering angle (rad)
    #[serde(default, alias = "steering_angle")]
    pub steering_angle: f64,
    /// Position in the local planar frame (m)
    #[serde(default, alias = "position_x", alias = "x")]
    pub position_x: f64,
    /// Position in the local planar frame (m)
    #[serde(default, alias = "position_y", alias = "y")]
    pub position_y: f64,
    /// Distance to the nearest hazard (m). Smaller is worse.
    #[serde(default, alias = "collision_margin")]
    pub collision_margin: f64,
    /// Reference path position at the same time (m)
    #[serde(default, alias = "planned_path_x")]
    pub planned_path_x: f64,
    /// Reference path position at the same time (m)
    #[serde(default, alias = "planned_path_y")]
    pub planned_path_y: f64,
}

impl Sample {
    /// Canonical names of the scalar signals carried by every sample
    pub const SIGNAL_NAMES: [&'static str; 8] = [
        "vehicle_speed",
        "acceleration",
        "steering_angle",
        "position_x",
        "position_y",
        "collision_margin",
        "planned_path_x",
        "planned_path_y",
    ];

    /// Create a sample at `time` with all signals zeroed
    pub fn at(time: f64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Builder-style setter for the collision margin
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.collision_margin = margin;
        self
    }

    /// Builder-style setter for the vehicle speed
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.vehicle_speed = speed;
        self
    }

    /// Canonical snake_case name for a signal spelled either way
    pub fn canonical_name(name: &str) -> Option<&'static str> {
        let canonical = match name {
            "vehicle_speed" | "vehicleSpeed" => "vehicle_speed",
            "acceleration" => "acceleration",
            "steering_angle" | "steeringAngle" => "steering_angle",
            "position_x" | "positionX" => "position_x",
            "position_y" | "positionY" => "position_y",
            "collision_margin" | "collisionMargin" => "collision_margin",
            "planned_path_x" | "plannedPathX" => "planned_path_x",
            "planned_path_y" | "plannedPathY" => "planned_path_y",
            _ => return None,
        };
        Some(canonical)
    }

    /// Look up a signal by name.
    ///
    /// Accepts the snake_case names in [`Sample::SIGNAL_NAMES`] as well as
    /// their camelCase spelling.
    pub fn signal(&self, name: &str) -> Option<f64> {
        let value = match Self::canonical_name(name)? {
            "vehicle_speed" => self.vehicle_speed,
            "acceleration" => self.acceleration,
            "steering_angle" => self.steering_angle,
            "position_x" => self.position_x,
            "position_y" => self.position_y,
            "collision_margin" => self.collision_margin,
            "planned_path_x" => self.planned_path_x,
            _ => self.planned_path_y,
        };
        Some(value)
    }

    /// Mutable access to a signal by canonical name (used by loaders)
    pub(crate) fn signal_mut(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "vehicle_speed" => &mut self.vehicle_speed,
            "acceleration" => &mut self.acceleration,
            "steering_angle" => &mut self.steering_angle,
            "position_x" => &mut self.position_x,
            "position_y" => &mut self.position_y,
            "collision_margin" => &mut self.collision_margin,
            "planned_path_x" => &mut self.planned_path_x,
            "planned_path_y" => &mut self.planned_path_y,
            _ => return None,
        };
        Some(slot)
    }
}

/// Kind of data a signal carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Scalar value over time
    Temporal,
    /// Coordinate in the local frame
    Spatial,
    /// Discrete label
    Categorical,
    /// On/off flag
    Boolean,
}

/// Signal metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Canonical snake_case name
    pub name: String,
    /// Kind of data carried
    pub kind: SignalKind,
    /// Physical units
    pub units: String,
    /// Human-readable description
    pub description: String,
    /// Observed (min, max) over the trip, if known
    pub value_range: Option<(f64, f64)>,
}

fn catalogue_entry(name: &str) -> (SignalKind, &'static str, &'static str) {
    match name {
        "vehicle_speed" => (SignalKind::Temporal, "m/s", "Vehicle speed"),
        "acceleration" => (SignalKind::Temporal, "m/s²", "Longitudinal acceleration"),
        "steering_angle" => (SignalKind::Temporal, "rad", "Steering wheel angle"),
        "position_x" => (SignalKind::Spatial, "m", "Vehicle position X"),
        "position_y" => (SignalKind::Spatial, "m", "Vehicle position Y"),
        "collision_margin" => (
            SignalKind::Temporal,
            "m",
            "Distance margin to nearest obstacle",
        ),
        "planned_path_x" => (SignalKind::Spatial, "m", "Planned path X"),
        "planned_path_y" => (SignalKind::Spatial, "m", "Planned path Y"),
        _ => (SignalKind::Temporal, "unknown", "Unknown signal"),
    }
}

/// Summary of a loaded trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    /// Unique id of this summary
    pub id: Uuid,
    /// Trip name
    pub name: String,
    /// Where the trip came from (file path, generator name, ...)
    pub source: String,
    /// Seconds
    pub duration: f64,
    /// Samples per second, estimated from the median sample spacing
    pub frequency: f64,
    /// Number of samples
    pub sample_count: usize,
    /// Number of signals per sample
    pub signal_count: usize,
    /// When the summary was built
    pub created_at: DateTime<Utc>,
}

/// A loaded trip. Cloning is cheap; the samples are shared.
#[derive(Debug, Clone)]
pub struct Trip {
    name: String,
    samples: Arc<[Sample]>,
}

impl Trip {
    /// Create a trip from samples ordered by time
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples: samples.into(),
        }
    }

    /// Trip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All samples
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Shared handle to the samples
    pub fn shared_samples(&self) -> Arc<[Sample]> {
        Arc::clone(&self.samples)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the last sample, or 0 for an empty trip
    pub fn duration(&self) -> f64 {
        self.samples.last().map(|s| s.time).unwrap_or_default()
    }

    /// (first, last) sample time
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.samples.first()?.time, self.samples.last()?.time))
    }

    /// Samples inside an inclusive time window
    pub fn samples_in_range(&self, start: f64, end: f64) -> impl Iterator<Item = &Sample> {
        self.samples
            .iter()
            .filter(move |s| s.time >= start && s.time <= end)
    }

    /// Extract one signal as a time series named by its canonical name
    pub fn series(&self, name: &str) -> Option<SignalSeries> {
        let name = Sample::canonical_name(name)?;
        let points = self
            .samples
            .iter()
            .filter_map(|s| s.signal(name).map(|v| DataPoint::new(s.time, v)))
            .collect();
        Some(SignalSeries::new(name, points))
    }

    /// Metadata for every signal, with value ranges from this trip
    pub fn signals(&self) -> Vec<SignalInfo> {
        Sample::SIGNAL_NAMES
            .iter()
            .map(|&name| {
                let (kind, units, description) = catalogue_entry(name);
                let value_range = self
                    .samples
                    .iter()
                    .filter_map(|s| s.signal(name))
                    .fold(None, |range: Option<(f64, f64)>, v| match range {
                        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                        None => Some((v, v)),
                    });
                SignalInfo {
                    name: name.to_string(),
                    kind,
                    units: units.to_string(),
                    description: description.to_string(),
                    value_range,
                }
            })
            .collect()
    }

    /// Estimated sampling frequency in Hz (0 if it cannot be determined)
    pub fn frequency(&self) -> f64 {
        let mut gaps: Vec<f64> = self
            .samples
            .windows(2)
            .map(|w| w[1].time - w[0].time)
            .filter(|dt| *dt > 0.0)
            .collect();
        if gaps.is_empty() {
            return 0.0;
        }
        gaps.sort_by(f64::total_cmp);
        1.0 / gaps[gaps.len() / 2]
    }

    /// Check time ordering and signal values
    pub fn validate(&self) -> ValidationReport {
        validation::validate_samples(&self.samples)
    }

    /// Actual vs planned path, sampled every 10th positioned sample
    pub fn path_deviation(&self) -> Option<TrajectoryDeviation> {
        trajectory::analyze_deviation(&self.samples, DEFAULT_DEVIATION_STRIDE)
    }

    /// Speed and position ranges
    pub fn trajectory_stats(&self) -> TrajectoryStats {
        trajectory::trajectory_stats(&self.samples)
    }

    /// Build a summary record for this trip
    pub fn summary(&self, source: impl Into<String>) -> TripSummary {
        TripSummary {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            source: source.into(),
            duration: self.duration(),
            frequency: self.frequency(),
            sample_count: self.samples.len(),
            signal_count: Sample::SIGNAL_NAMES.len(),
            created_at: Utc::now(),
        }
    }
}
