//! # TripScope Core Library
//!
//! Core functionality for the TripScope trip telemetry viewer.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Trip log loading (CSV and JSON)
//! - Nearest-sample lookup and signal interpolation
//! - Collision-margin violation detection
//! - Playback clock and controller
//! - Path deviation analysis and trip validation
//! - Synthetic demo trips
//!
//! ## Example
//!
//! ```rust,ignore
//! use tripscope_core::prelude::*;
//!
//! let trip = tripscope_core::datalog::load_trip("trip.csv")?;
//! let mut player = PlaybackController::new(trip, &PlaybackConfig::default());
//!
//! player.play();
//! for _ in 0..50 {
//!     if let Some(v) = player.tick() {
//!         println!("{} at {}", v.severity, format_time(v.time));
//!     }
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod datalog;
pub mod demo;
pub mod playback;
pub mod sampler;
pub mod trajectory;
pub mod trip;
pub mod validation;
pub mod violation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, CacheStats, SignalCache};
    pub use crate::clock::{format_time, ClockTick, QueryClock};
    pub use crate::config::PlaybackConfig;
    pub use crate::datalog::{load_trip, DatalogError, LogFormat};
    pub use crate::demo::{Scenario, TripGenerator};
    pub use crate::playback::PlaybackController;
    pub use crate::sampler::{
        find_nearest, interpolate, interpolate_at, BinarySearchPolicy, DataPoint, NearestSample,
        SamplerError, SignalValue, TolerancePolicy,
    };
    pub use crate::trajectory::{PathQuality, TrajectoryDeviation, TrajectoryStats};
    pub use crate::trip::{Sample, Trip, TripSummary};
    pub use crate::validation::ValidationReport;
    pub use crate::violation::{
        active_violations, DetectorConfig, Severity, TriggerMode, Violation, ViolationDetector,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
