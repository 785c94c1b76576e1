//! Trip playback
//!
//! Drives the query clock over a loaded trip, resolving the active sample
//! and feeding it to the violation detector once per time change.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::cache::SignalCache;
use crate::clock::{ClockTick, QueryClock};
use crate::config::PlaybackConfig;
use crate::datalog;
use crate::sampler::{NearestSample, SignalSeries, SignalValue, TolerancePolicy, MATCH_TOLERANCE};
use crate::trip::{Sample, Trip};
use crate::violation::{scan_collision_events, CollisionEvent, Violation, ViolationDetector};

/// Trip player for interactive playback
pub struct PlaybackController {
    trip: Trip,
    clock: QueryClock,
    sampler: Box<dyn NearestSample>,
    detector: ViolationDetector,
    cache: SignalCache,
    /// Lazily extracted per-signal series
    series: HashMap<&'static str, SignalSeries>,
    /// Index of the last successfully resolved sample
    current: Option<usize>,
    tick_period: Duration,
}

impl PlaybackController {
    /// Create a paused player positioned at 0.
    ///
    /// Out-of-range settings are logged and replaced by safe values, so a
    /// hand-built config never drives the clock outside the trip.
    pub fn new(trip: Trip, config: &PlaybackConfig) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!("Playback config rejected, falling back per field: {}", e);
        }
        let tolerance = if config.tolerance.is_finite() && config.tolerance >= 0.0 {
            config.tolerance
        } else {
            MATCH_TOLERANCE
        };

        let mut clock = QueryClock::new(trip.duration()).with_time_step(config.time_step);
        clock.set_speed(config.default_speed);

        let mut controller = Self {
            trip,
            clock,
            sampler: Box::new(TolerancePolicy::new(tolerance)),
            detector: ViolationDetector::new(config.detector.clone()),
            cache: SignalCache::new(&config.cache),
            series: HashMap::new(),
            current: None,
            tick_period: Duration::from_millis(config.tick_period_ms.max(1)),
        };
        controller.resolve();
        controller
    }

    /// Load a trip log and config file and create a player
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(trip_path: P, config_path: Option<Q>) -> anyhow::Result<Self> {
        let trip_path = trip_path.as_ref();
        let config = match config_path {
            Some(path) => {
                let path = path.as_ref();
                PlaybackConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            None => PlaybackConfig::default(),
        };
        let trip = datalog::load_trip(trip_path)
            .with_context(|| format!("loading trip {}", trip_path.display()))?;
        Ok(Self::new(trip, &config))
    }

    /// Swap the nearest-sample strategy
    pub fn with_sampler(mut self, sampler: Box<dyn NearestSample>) -> Self {
        self.sampler = sampler;
        self.current = None;
        self.detector.rearm();
        self.resolve();
        self
    }

    /// The trip being played
    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    /// The playback clock
    pub fn clock(&self) -> &QueryClock {
        &self.clock
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Start playback
    pub fn play(&mut self) {
        self.clock.play();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) -> bool {
        self.clock.toggle()
    }

    /// Set the playback multiplier
    pub fn set_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
    }

    /// Advance one tick.
    ///
    /// Returns the violation logged at the new time, if any.
    pub fn tick(&mut self) -> Option<Violation> {
        match self.clock.tick() {
            ClockTick::Idle => None,
            ClockTick::Advanced(_) => self.resolve(),
            ClockTick::Wrapped => {
                self.detector.rearm();
                self.resolve()
            }
        }
    }

    /// Jump to a time
    pub fn seek(&mut self, time: f64) -> Option<Violation> {
        let before = self.clock.current_time();
        self.clock.seek(time);
        if self.clock.current_time() == before {
            return None;
        }
        self.detector.rearm();
        self.resolve()
    }

    /// Resolve the sample at the current time and observe it
    fn resolve(&mut self) -> Option<Violation> {
        let time = self.clock.current_time();
        match self.sampler.index_of(self.trip.samples(), time) {
            Ok(index) => {
                self.current = Some(index);
                let sample = self.trip.samples()[index];
                self.detector.observe(&sample, time)
            }
            Err(e) => {
                tracing::debug!("No sample at t={:.2}s, keeping previous: {}", time, e);
                None
            }
        }
    }

    /// The last successfully resolved sample
    pub fn current_sample(&self) -> Option<&Sample> {
        self.trip.samples().get(self.current?)
    }

    /// Interpolated value of a signal at the current time.
    ///
    /// Either spelling of a signal name shares one series and one set of
    /// cache entries. Returns `None` for unknown signals or when the trip is
    /// empty.
    pub fn signal_value(&mut self, name: &str) -> Option<SignalValue> {
        let name = Sample::canonical_name(name)?;
        let time = self.clock.current_time();
        if !self.series.contains_key(name) {
            let series = self.trip.series(name)?;
            self.series.insert(name, series);
        }
        let series = self.series.get(name)?;
        match self
            .cache
            .get_or_try_insert_with(name, time, || series.value_at(time))
        {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Cannot interpolate '{}' at t={:.2}s: {}", name, time, e);
                None
            }
        }
    }

    /// Trailing violation log, oldest first
    pub fn violations(&self) -> &VecDeque<Violation> {
        self.detector.log()
    }

    /// Violations relevant to the current time
    pub fn active_violations(&self) -> Vec<Violation> {
        self.detector.active_violations(self.clock.current_time())
    }

    /// Every below-threshold sample of the trip in `[start, end]`
    pub fn collision_events(&self, start: f64, end: f64) -> Vec<CollisionEvent> {
        scan_collision_events(self.trip.samples(), start, end, self.detector.config())
    }

    /// The signal cache
    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    /// Tick on a timer until `stop` becomes true or its sender is dropped
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Playback loop stopped at t={:.2}s", self.clock.current_time());
    }
}
