//! Violation Detector
//!
//! Watches the collision margin of the resolved sample as playback advances
//! and keeps a short trailing log of threshold crossings.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::trip::Sample;

/// Margin below which a sample is a violation (m)
pub const WARNING_THRESHOLD: f64 = 1.5;
/// Margin below which a violation is critical (m)
pub const CRITICAL_THRESHOLD: f64 = 1.0;
/// Number of violations kept in the trailing log
pub const LOG_CAPACITY: usize = 5;
/// Violations within this many seconds of the current time are "active"
pub const RELEVANCE_WINDOW: f64 = 5.0;

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Margin below the warning threshold
    Warning,
    /// Margin below the critical threshold
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A detected safety-margin breach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Query time at which the breach was observed
    pub time: f64,
    /// Collision margin that triggered it
    pub margin: f64,
    /// Warning or critical
    pub severity: Severity,
}

/// When a sample below threshold is logged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Log only on the transition from ok to violating
    #[default]
    Edge,
    /// Log every observation below threshold
    Level,
}

/// Detector tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Margins below this are violations (m)
    pub warning_threshold: f64,
    /// Margins below this are critical (m)
    pub critical_threshold: f64,
    /// Maximum entries in the trailing log
    pub log_capacity: usize,
    /// Seconds
    pub relevance_window: f64,
    /// Edge or level triggering
    pub trigger_mode: TriggerMode,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            warning_threshold: WARNING_THRESHOLD,
            critical_threshold: CRITICAL_THRESHOLD,
            log_capacity: LOG_CAPACITY,
            relevance_window: RELEVANCE_WINDOW,
            trigger_mode: TriggerMode::Edge,
        }
    }
}

impl DetectorConfig {
    /// Severity for a margin, or `None` if the margin is safe
    pub fn classify(&self, margin: f64) -> Option<Severity> {
        if margin.is_nan() || margin >= self.warning_threshold {
            return None;
        }
        if margin < self.critical_threshold {
            Some(Severity::Critical)
        } else {
            Some(Severity::Warning)
        }
    }
}

/// Stateful violation detector with a bounded FIFO log
#[derive(Debug, Clone)]
pub struct ViolationDetector {
    config: DetectorConfig,
    log: VecDeque<Violation>,
    /// Whether the previous observation was below threshold
    was_violating: bool,
    /// Query time of the previous observation
    last_query: Option<f64>,
}

impl Default for ViolationDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl ViolationDetector {
    /// Create a detector.
    ///
    /// A zero `log_capacity` is raised to 1 so every logged violation is
    /// retrievable.
    pub fn new(mut config: DetectorConfig) -> Self {
        if config.log_capacity == 0 {
            tracing::warn!("Detector log capacity 0, using 1");
            config.log_capacity = 1;
        }
        Self {
            log: VecDeque::with_capacity(config.log_capacity + 1),
            config,
            was_violating: false,
            last_query: None,
        }
    }

    /// Detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Inspect a resolved sample at `query_time`.
    ///
    /// Returns the violation that was appended to the log, if any. Observing
    /// the same query time twice in a row never appends twice.
    pub fn observe(&mut self, sample: &Sample, query_time: f64) -> Option<Violation> {
        if self.last_query == Some(query_time) {
            return None;
        }
        self.last_query = Some(query_time);

        let margin = sample.collision_margin;
        let severity = self.config.classify(margin);
        let was_violating = std::mem::replace(&mut self.was_violating, severity.is_some());
        let severity = severity?;

        if self.config.trigger_mode == TriggerMode::Edge && was_violating {
            return None;
        }

        let violation = Violation {
            time: query_time,
            margin,
            severity,
        };
        self.log.push_back(violation);
        while self.log.len() > self.config.log_capacity {
            self.log.pop_front();
        }
        tracing::debug!(
            "{} violation at t={:.2}s (margin {:.2}m)",
            severity,
            query_time,
            margin
        );
        Some(violation)
    }

    /// Trailing log, oldest first
    pub fn log(&self) -> &VecDeque<Violation> {
        &self.log
    }

    /// Log entries relevant to `current_time`
    pub fn active_violations(&self, current_time: f64) -> Vec<Violation> {
        active_within(&self.log, current_time, self.config.relevance_window)
    }

    /// Forget the previous observation but keep the log.
    ///
    /// Used when playback jumps (seek, loop to start) so the next violating
    /// sample counts as a fresh transition.
    pub fn rearm(&mut self) {
        self.was_violating = false;
        self.last_query = None;
    }

    /// Clear the log and the edge state
    pub fn reset(&mut self) {
        self.log.clear();
        self.rearm();
    }
}

/// Entries of `log` within the default relevance window of `current_time`
pub fn active_violations<'a, I>(log: I, current_time: f64) -> Vec<Violation>
where
    I: IntoIterator<Item = &'a Violation>,
{
    active_within(log, current_time, RELEVANCE_WINDOW)
}

fn active_within<'a, I>(log: I, current_time: f64, window: f64) -> Vec<Violation>
where
    I: IntoIterator<Item = &'a Violation>,
{
    log.into_iter()
        .filter(|v| (v.time - current_time).abs() < window)
        .copied()
        .collect()
}

/// A violation found by an offline scan of the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Sample time (s)
    pub time: f64,
    /// Warning or critical
    pub severity: Severity,
    /// Collision margin (m)
    pub margin: f64,
    /// Vehicle speed (m/s)
    pub vehicle_speed: f64,
    /// `margin / speed`, or `None` when the vehicle is not moving
    pub time_to_collision: Option<f64>,
    /// Human-readable summary
    pub description: String,
}

/// Every sample below threshold in the inclusive window `[start, end]`.
///
/// Unlike [`ViolationDetector`] this is unbounded and level triggered.
pub fn scan_collision_events(
    samples: &[Sample],
    start: f64,
    end: f64,
    config: &DetectorConfig,
) -> Vec<CollisionEvent> {
    samples
        .iter()
        .filter(|s| s.time >= start && s.time <= end)
        .filter_map(|s| {
            let severity = config.classify(s.collision_margin)?;
            let ttc = (s.vehicle_speed > 0.0 && s.collision_margin > 0.0)
                .then(|| s.collision_margin / s.vehicle_speed);
            Some(CollisionEvent {
                time: s.time,
                severity,
                margin: s.collision_margin,
                vehicle_speed: s.vehicle_speed,
                time_to_collision: ttc,
                description: describe(severity, s.collision_margin, ttc),
            })
        })
        .collect()
}

fn describe(severity: Severity, margin: f64, ttc: Option<f64>) -> String {
    let ttc = match ttc {
        Some(t) => format!("{:.1}s", t),
        None => "n/a".to_string(),
    };
    match severity {
        Severity::Critical => format!("Critical collision risk! Margin: {:.1}m, TTC: {}", margin, ttc),
        Severity::Warning => format!("Collision warning. Margin: {:.1}m, TTC: {}", margin, ttc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn margin(m: f64) -> Sample {
        Sample::at(0.0).with_margin(m)
    }

    #[test]
    fn test_severity_classification() {
        let mut detector = ViolationDetector::default();
        let v = detector.observe(&margin(0.8), 1.0).unwrap();
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.margin, 0.8);

        let mut detector = ViolationDetector::default();
        assert_eq!(
            detector.observe(&margin(1.2), 2.0).map(|v| v.severity),
            Some(Severity::Warning)
        );

        let mut detector = ViolationDetector::default();
        assert_eq!(detector.observe(&margin(2.0), 3.0), None);
        assert!(detector.log().is_empty());
    }

    #[test]
    fn test_threshold_boundaries() {
        let config = DetectorConfig::default();
        assert_eq!(config.classify(1.5), None);
        assert_eq!(config.classify(1.0), Some(Severity::Warning));
        assert_eq!(config.classify(0.0), Some(Severity::Critical));
        assert_eq!(config.classify(f64::NAN), None);
    }

    #[test]
    fn test_edge_triggered_logs_transitions_only() {
        let mut detector = ViolationDetector::default();
        assert!(detector.observe(&margin(1.2), 0.1).is_some());
        assert!(detector.observe(&margin(1.1), 0.2).is_none());
        assert!(detector.observe(&margin(0.5), 0.3).is_none());
        assert!(detector.observe(&margin(3.0), 0.4).is_none());
        assert!(detector.observe(&margin(0.5), 0.5).is_some());
        assert_eq!(detector.log().len(), 2);
    }

    #[test]
    fn test_same_time_never_duplicates() {
        let config = DetectorConfig {
            trigger_mode: TriggerMode::Level,
            ..Default::default()
        };
        let mut detector = ViolationDetector::new(config);
        assert!(detector.observe(&margin(0.5), 1.0).is_some());
        assert!(detector.observe(&margin(0.5), 1.0).is_none());
        assert_eq!(detector.log().len(), 1);
    }

    #[test]
    fn test_log_eviction() {
        let config = DetectorConfig {
            trigger_mode: TriggerMode::Level,
            ..Default::default()
        };
        let mut detector = ViolationDetector::new(config);
        for i in 0..6 {
            detector.observe(&margin(1.0), i as f64);
        }
        assert_eq!(detector.log().len(), 5);
        assert!(detector.log().iter().all(|v| v.time != 0.0));
        assert_eq!(detector.log().front().unwrap().time, 1.0);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let config = DetectorConfig {
            log_capacity: 0,
            ..Default::default()
        };
        let mut detector = ViolationDetector::new(config);
        assert_eq!(detector.config().log_capacity, 1);

        let v = detector.observe(&margin(0.5), 1.0).unwrap();
        assert_eq!(detector.log().back(), Some(&v));
        assert_eq!(detector.log().len(), 1);
    }

    #[test]
    fn test_log_eviction_edge_mode() {
        let mut detector = ViolationDetector::default();
        for i in 0..6 {
            let t = i as f64 * 2.0;
            detector.observe(&margin(0.9), t);
            detector.observe(&margin(4.0), t + 1.0);
        }
        assert_eq!(detector.log().len(), 5);
        assert_eq!(detector.log().front().unwrap().time, 2.0);
    }

    #[test]
    fn test_active_violations_window() {
        let log = vec![
            Violation { time: 1.0, margin: 1.2, severity: Severity::Warning },
            Violation { time: 7.0, margin: 0.4, severity: Severity::Critical },
            Violation { time: 11.9, margin: 0.9, severity: Severity::Critical },
        ];
        let active = active_violations(&log, 7.0);
        assert_eq!(active, log[1..].to_vec());
        assert!(active_violations(&log, 20.0).is_empty());
    }

    #[test]
    fn test_rearm_keeps_log() {
        let mut detector = ViolationDetector::default();
        detector.observe(&margin(0.9), 1.0);
        detector.rearm();
        assert!(detector.observe(&margin(0.9), 1.0).is_some());
        assert_eq!(detector.log().len(), 2);

        detector.reset();
        assert!(detector.log().is_empty());
    }

    #[test]
    fn test_scan_collision_events() {
        let samples = vec![
            Sample::at(0.0).with_margin(3.0).with_speed(10.0),
            Sample::at(1.0).with_margin(1.2).with_speed(6.0),
            Sample::at(2.0).with_margin(0.5).with_speed(0.0),
            Sample::at(3.0).with_margin(0.1).with_speed(2.0),
        ];
        let events = scan_collision_events(&samples, 0.0, 2.0, &DetectorConfig::default());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, Severity::Warning);
        assert!((events[0].time_to_collision.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(events[0].description, "Collision warning. Margin: 1.2m, TTC: 0.2s");
        assert_eq!(events[1].time_to_collision, None);
        assert_eq!(events[1].description, "Critical collision risk! Margin: 0.5m, TTC: n/a");
    }
}
