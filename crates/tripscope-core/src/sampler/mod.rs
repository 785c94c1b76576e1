//! Signal Sampler
//!
//! Resolves the sample active at a playback time and interpolates
//! individual signals between raw data points.

mod error;
mod interpolate;
mod nearest;
mod series;

pub use error::SamplerError;
pub use interpolate::{interpolate, interpolate_at, DataPoint, SignalValue};
pub use nearest::{find_nearest, BinarySearchPolicy, NearestSample, TolerancePolicy, MATCH_TOLERANCE};
pub use series::SignalSeries;
