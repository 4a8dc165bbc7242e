//! Observation side channel
//!
//! Named, tagged timing events emitted by the service. Sinks are best effort:
//! the service logs and drops sink errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::latency::LatencyClass;
use crate::Result;

/// One timing event
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub name: &'static str,
    pub latency: LatencyClass,
    pub delay_ms: u64,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(name: &'static str, delay: Duration, latency: LatencyClass) -> Self {
        Self {
            name,
            latency,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            observed_at: Utc::now(),
        }
    }
}

/// Receiver of observations
pub trait ObservationSink: Send + Sync {
    fn record(&self, observation: &Observation) -> Result<()>;
}

/// Writes observations to the log as structured events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservationSink;

impl ObservationSink for TracingObservationSink {
    fn record(&self, observation: &Observation) -> Result<()> {
        tracing::info!(
            target: "customer_api::observation",
            operation = observation.name,
            latency = %observation.latency,
            delay_ms = observation.delay_ms,
            observed_at = %observation.observed_at,
            "observation"
        );
        Ok(())
    }
}
