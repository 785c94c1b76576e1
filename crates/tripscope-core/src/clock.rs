//! Playback clock and time display

use serde::{Deserialize, Serialize};

/// Seconds advanced per tick at 1x speed
pub const DEFAULT_TIME_STEP: f64 = 0.1;
/// Slowest playback multiplier
pub const MIN_SPEED: f64 = 0.1;
/// Fastest playback multiplier
pub const MAX_SPEED: f64 = 10.0;

/// Result of advancing the clock by one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockTick {
    /// Paused or nothing to play, time unchanged
    Idle,
    /// Time moved forward to the contained value
    Advanced(f64),
    /// Reached the end and looped back to 0
    Wrapped,
}

/// Current playback position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryClock {
    current_time: f64,
    max_time: f64,
    is_playing: bool,
    speed: f64,
    time_step: f64,
}

impl QueryClock {
    /// Create a paused clock at 0 for a trip of `max_time` seconds
    pub fn new(max_time: f64) -> Self {
        Self {
            current_time: 0.0,
            max_time: if max_time.is_finite() { max_time.max(0.0) } else { 0.0 },
            is_playing: false,
            speed: 1.0,
            time_step: DEFAULT_TIME_STEP,
        }
    }

    /// Override the seconds advanced per tick at 1x.
    ///
    /// Non-positive or non-finite steps fall back to [`DEFAULT_TIME_STEP`].
    pub fn with_time_step(mut self, step: f64) -> Self {
        self.time_step = if step.is_finite() && step > 0.0 {
            step
        } else {
            tracing::warn!("Invalid time step {}, using {}", step, DEFAULT_TIME_STEP);
            DEFAULT_TIME_STEP
        };
        self
    }

    /// Seconds advanced per tick at 1x
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// End of the trip in seconds
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Whether the clock advances on tick
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Playback multiplier
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Start playback
    pub fn play(&mut self) {
        self.is_playing = true;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Toggle play/pause, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Set the playback multiplier, clamped to [`MIN_SPEED`]..=[`MAX_SPEED`]
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_nan() {
            1.0
        } else {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        };
    }

    /// Jump to `time`, clamped to `[0, max_time]`
    pub fn seek(&mut self, time: f64) {
        self.current_time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.max_time)
        };
    }

    /// Advance by `time_step * speed` if playing.
    ///
    /// Reaching or passing `max_time` loops back to 0 rather than stopping.
    pub fn tick(&mut self) -> ClockTick {
        if !self.is_playing || self.max_time <= 0.0 {
            return ClockTick::Idle;
        }
        let next = (self.current_time + self.time_step * self.speed).max(0.0);
        if next >= self.max_time {
            self.current_time = 0.0;
            ClockTick::Wrapped
        } else {
            self.current_time = next;
            ClockTick::Advanced(next)
        }
    }
}

/// Format seconds as `MM:SS.s`.
///
/// Minutes are zero-padded to two digits, seconds to four characters
/// including one decimal. Negative and non-finite input formats as zero.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{:02}:{:04.1}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(125.3), "02:05.3");
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(59.9), "00:59.9");
        assert_eq!(format_time(600.0), "10:00.0");
        assert_eq!(format_time(-3.0), "00:00.0");
        assert_eq!(format_time(f64::NAN), "00:00.0");
    }

    #[test]
    fn test_tick_advances_only_when_playing() {
        let mut clock = QueryClock::new(10.0);
        assert_eq!(clock.tick(), ClockTick::Idle);
        clock.play();
        clock.set_speed(2.0);
        assert_eq!(clock.tick(), ClockTick::Advanced(0.2));
        assert!((clock.current_time() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_tick_wraps_to_start() {
        let mut clock = QueryClock::new(1.0);
        clock.play();
        clock.seek(0.95);
        assert_eq!(clock.tick(), ClockTick::Wrapped);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn test_seek_and_speed_clamp() {
        let mut clock = QueryClock::new(30.0);
        clock.seek(45.0);
        assert_eq!(clock.current_time(), 30.0);
        clock.seek(-1.0);
        assert_eq!(clock.current_time(), 0.0);

        clock.set_speed(50.0);
        assert_eq!(clock.speed(), MAX_SPEED);
        clock.set_speed(0.0);
        assert_eq!(clock.speed(), MIN_SPEED);
    }

    #[test]
    fn test_empty_trip_never_advances() {
        let mut clock = QueryClock::new(0.0);
        clock.play();
        assert_eq!(clock.tick(), ClockTick::Idle);
    }

    #[test]
    fn test_invalid_time_step_falls_back() {
        for step in [-0.1, 0.0, f64::NAN, f64::INFINITY] {
            let mut clock = QueryClock::new(5.0).with_time_step(step);
            assert_eq!(clock.time_step(), DEFAULT_TIME_STEP);
            clock.play();
            clock.tick();
            clock.tick();
            assert!(clock.current_time() >= 0.0);
            assert!((clock.current_time() - 0.2).abs() < 1e-12);
        }
    }
}
