//! Simulated processing latency
//!
//! The service draws a delay from a [`LatencySource`] before handing results
//! back, which makes the observation pipeline have something to report.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MAX_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_HIGH_THRESHOLD: Duration = Duration::from_millis(250);

/// Produces the artificial delay for one operation
pub trait LatencySource: Send + Sync {
    fn next_delay(&self) -> Duration;

    /// Delays strictly above this are tagged `high`
    fn high_threshold(&self) -> Duration {
        DEFAULT_HIGH_THRESHOLD
    }

    fn classify(&self, delay: Duration) -> LatencyClass {
        LatencyClass::of(delay, self.high_threshold())
    }
}

/// Observation tag derived from a drawn delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyClass {
    Low,
    High,
}

impl LatencyClass {
    pub fn of(delay: Duration, threshold: Duration) -> Self {
        if delay > threshold {
            LatencyClass::High
        } else {
            LatencyClass::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LatencyClass::Low => "low",
            LatencyClass::High => "high",
        }
    }
}

impl fmt::Display for LatencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniformly random whole-millisecond delay in `[0, max)`
#[derive(Debug, Clone)]
pub struct RandomLatency {
    max_ms: u64,
    high_threshold: Duration,
}

impl RandomLatency {
    pub fn new(max: Duration, high_threshold: Duration) -> Self {
        Self {
            max_ms: max.as_millis() as u64,
            high_threshold,
        }
    }
}

impl Default for RandomLatency {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LATENCY, DEFAULT_HIGH_THRESHOLD)
    }
}

impl LatencySource for RandomLatency {
    fn next_delay(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..self.max_ms))
    }

    fn high_threshold(&self) -> Duration {
        self.high_threshold
    }
}

/// Always the same delay
#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub Duration);

impl LatencySource for FixedLatency {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// No delay at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl LatencySource for NoLatency {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}
