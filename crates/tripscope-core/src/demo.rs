//! Demo Mode - Synthetic trip generator
//!
//! Generates plausible vehicle trajectories for testing and demonstration
//! without a recorded trip. Three scenarios are available: normal driving,
//! emergency braking (margin dips into the warning band) and a near
//! collision (margin dips into the critical band).

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::trip::{Sample, Trip};

/// Distance between axles (m)
const WHEELBASE: f64 = 2.5;
/// Braking deceleration (m/s², positive)
const MAX_DECELERATION: f64 = 10.0;
/// Steering oscillation frequency (Hz)
const STEERING_FREQUENCY: f64 = 0.1;
/// Steering oscillation amplitude (rad)
const STEERING_AMPLITUDE: f64 = 0.02;
/// Width of the margin dip (s)
const DIP_WIDTH: f64 = 1.5;

/// Driving scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Accelerate, cruise, decelerate
    Normal,
    /// Hard braking at 60% of the trip
    Emergency,
    /// Near miss at 70% of the trip
    Collision,
}

impl Scenario {
    fn label(&self) -> &'static str {
        match self {
            Scenario::Normal => "normal",
            Scenario::Emergency => "emergency",
            Scenario::Collision => "collision",
        }
    }

    /// (time of closest approach as a fraction of duration, minimum margin)
    fn margin_dip(&self) -> Option<(f64, f64)> {
        match self {
            Scenario::Normal => None,
            Scenario::Emergency => Some((0.6, 1.25)),
            Scenario::Collision => Some((0.7, 0.5)),
        }
    }
}

/// Synthetic trip generator
pub struct TripGenerator {
    /// Seconds
    duration: f64,
    /// Hz
    frequency: f64,
    /// m/s
    max_speed: f64,
    scenario: Scenario,
    rng: StdRng,
}

impl TripGenerator {
    /// 60 s at 10 Hz with a 30 m/s top speed, randomly seeded
    pub fn new(scenario: Scenario) -> Self {
        Self {
            duration: 60.0,
            frequency: 10.0,
            max_speed: 30.0,
            scenario,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Trip length in seconds
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Samples per second
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency.max(f64::MIN_POSITIVE);
        self
    }

    /// Cruise speed in m/s
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed.max(0.0);
        self
    }

    /// Generate a trip
    pub fn generate(&mut self) -> Trip {
        let dt = 1.0 / self.frequency;
        let n = (self.duration * self.frequency).ceil() as usize;
        let times: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let speeds = self.speed_profile(&times);

        let mut samples = Vec::with_capacity(n);
        let mut pose = Pose::default();
        let mut planned = Pose::default();
        let mut prev_speed = 0.0;

        for (i, (&t, &v)) in times.iter().zip(&speeds).enumerate() {
            let steering = STEERING_AMPLITUDE * (2.0 * PI * STEERING_FREQUENCY * t).sin();
            let noisy_steering = steering + self.rng.gen_range(-0.001..=0.001);
            let noisy_speed = (v + self.rng.gen_range(-0.1..=0.1)).max(0.0);

            if i > 0 {
                pose.advance(noisy_speed, noisy_steering, dt);
                planned.advance(v, steering, dt);
            }

            let acceleration = if i > 0 { (noisy_speed - prev_speed) / dt } else { 0.0 };
            prev_speed = noisy_speed;

            samples.push(Sample {
                time: t,
                vehicle_speed: noisy_speed,
                acceleration,
                steering_angle: noisy_steering,
                position_x: pose.x,
                position_y: pose.y,
                collision_margin: self.margin_at(t),
                planned_path_x: planned.x,
                planned_path_y: planned.y,
            });
        }

        tracing::debug!(
            "Generated {} scenario: {} samples over {:.1}s",
            self.scenario.label(),
            samples.len(),
            self.duration
        );
        Trip::new(format!("demo-{}", self.scenario.label()), samples)
    }

    fn speed_profile(&self, times: &[f64]) -> Vec<f64> {
        let d = self.duration;
        let accel_end = 0.2 * d;
        let ramp = |t: f64| {
            if accel_end > 0.0 {
                self.max_speed * (t / accel_end).min(1.0)
            } else {
                self.max_speed
            }
        };
        // Braking from max speed, starting at `start`
        let braking = |t: f64, start: f64| (self.max_speed - MAX_DECELERATION * (t - start)).max(0.0);

        times
            .iter()
            .map(|&t| match self.scenario {
                Scenario::Normal => {
                    let decel_start = 0.8 * d;
                    if t < decel_start {
                        ramp(t)
                    } else {
                        self.max_speed * (1.0 - (t - decel_start) / (d - decel_start)).max(0.0)
                    }
                }
                Scenario::Emergency => {
                    let brake_at = 0.6 * d;
                    if t < brake_at {
                        ramp(t)
                    } else {
                        braking(t, brake_at)
                    }
                }
                Scenario::Collision => {
                    let brake_at = 0.7 * d - 0.5;
                    if t < brake_at {
                        ramp(t)
                    } else {
                        braking(t, brake_at)
                    }
                }
            })
            .collect()
    }

    fn margin_at(&mut self, t: f64) -> f64 {
        let clean = |t: f64| 8.0 + 2.0 * (0.2 * t).sin();
        let base = clean(t) + self.rng.gen_range(-0.2..=0.2);
        let margin = match self.scenario.margin_dip() {
            None => base,
            Some((at, minimum)) => {
                let center = at * self.duration;
                let depth = 1.0 - minimum / clean(center);
                let bump = (-((t - center) / DIP_WIDTH).powi(2)).exp();
                base * (1.0 - depth * bump)
            }
        };
        margin.max(0.0)
    }
}

/// Kinematic bicycle model state
#[derive(Debug, Default)]
struct Pose {
    x: f64,
    y: f64,
    heading: f64,
}

impl Pose {
    fn advance(&mut self, speed: f64, steering: f64, dt: f64) {
        self.heading += speed / WHEELBASE * steering.tan() * dt;
        self.x += speed * self.heading.cos() * dt;
        self.y += speed * self.heading.sin() * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_margin(trip: &Trip) -> f64 {
        trip.samples()
            .iter()
            .map(|s| s.collision_margin)
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_sample_count_and_ordering() {
        let trip = TripGenerator::new(Scenario::Normal).with_seed(1).generate();
        assert_eq!(trip.len(), 600);
        assert!(trip.samples().windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(trip.name(), "demo-normal");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = TripGenerator::new(Scenario::Collision).with_seed(7).generate();
        let b = TripGenerator::new(Scenario::Collision).with_seed(7).generate();
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn test_scenario_margins() {
        let normal = TripGenerator::new(Scenario::Normal).with_seed(3).generate();
        assert!(min_margin(&normal) > 1.5);

        let emergency = TripGenerator::new(Scenario::Emergency).with_seed(3).generate();
        let m = min_margin(&emergency);
        assert!((1.0..1.5).contains(&m), "emergency minimum margin {m}");

        let collision = TripGenerator::new(Scenario::Collision).with_seed(3).generate();
        assert!(min_margin(&collision) < 1.0);
    }

    #[test]
    fn test_emergency_vehicle_stops() {
        let trip = TripGenerator::new(Scenario::Emergency).with_seed(5).generate();
        let last = trip.samples().last().unwrap();
        assert!(last.vehicle_speed <= 0.1);
    }

    #[test]
    fn test_planned_path_follows_trajectory() {
        let trip = TripGenerator::new(Scenario::Normal)
            .with_seed(11)
            .with_duration(10.0)
            .generate();
        let last = trip.samples().last().unwrap();
        let dx = last.position_x - last.planned_path_x;
        let dy = last.position_y - last.planned_path_y;
        assert!((dx * dx + dy * dy).sqrt() < 10.0);
    }
}
