//! Core library for the cart-pole performance monitor.
//!
//! The crate exposes the inbound event models shared by the feed and the
//! aggregation engine, configuration loading utilities, and the orchestration
//! entry point used by the CLI application.

pub mod config;
pub mod engine;
pub mod feed;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// Joint state sample carrying parallel name/position/velocity arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
}

impl StateEvent {
    /// Returns the index of the named channel, if present.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

/// Commanded control force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceEvent {
    pub value: f64,
}

/// External disturbance force applied to the observed system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceEvent {
    pub value: f64,
}

/// Simulation clock tick split into whole seconds and a sub-second remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl ClockEvent {
    /// Builds a clock event from fractional seconds, mostly useful in tests.
    pub fn from_secs_f64(time: f64) -> Self {
        let mut seconds = time.floor() as i64;
        let mut nanoseconds = ((time - time.floor()) * 1e9).round() as i64;
        if nanoseconds >= 1_000_000_000 {
            seconds += 1;
            nanoseconds -= 1_000_000_000;
        }
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Simulation time in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / 1e9
    }
}

/// Any event delivered by the feed, tagged by stream kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryEvent {
    State(StateEvent),
    Force(ForceEvent),
    Disturbance(DisturbanceEvent),
    Clock(ClockEvent),
}

impl TelemetryEvent {
    /// Short stream label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryEvent::State(_) => "state",
            TelemetryEvent::Force(_) => "force",
            TelemetryEvent::Disturbance(_) => "disturbance",
            TelemetryEvent::Clock(_) => "clock",
        }
    }
}

/// Errors surfaced by the monitor. Every variant except the outer wiring ones
/// is recovered where it is detected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("required channel '{name}' not found in joint state")]
    MissingChannel { name: String },
    #[error("malformed joint state: {0}")]
    MalformedState(String),
    #[error(
        "not enough data collected yet: angles={angles} positions={positions} forces={forces} (need {required})"
    )]
    InsufficientData {
        angles: usize,
        positions: usize,
        forces: usize,
        required: usize,
    },
    #[error("decode failure: {0}")]
    Decode(String),
    #[error("I/O failure: {0}")]
    Io(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("report publish failure: {0}")]
    Publish(String),
    #[error("task join failure: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for MonitorError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}

/// Runs the monitor end-to-end once configuration is ready.
#[instrument(skip_all)]
pub async fn run(config: config::AppConfig) -> Result<(), MonitorError> {
    let aggregator = engine::aggregator::Aggregator::new(config.settings.clone());
    let source = feed::replay::ReplaySource::from_path(config.events.clone());
    feed::execute_monitor(
        config.runtime.clone(),
        aggregator,
        source,
        engine::reporter::LogReporter,
    )
    .await?;
    Ok(())
}

impl Display for TelemetryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryEvent::State(state) => write!(f, "State(channels={})", state.names.len()),
            TelemetryEvent::Force(force) => write!(f, "Force({:.3})", force.value),
            TelemetryEvent::Disturbance(d) => write!(f, "Disturbance({:.3})", d.value),
            TelemetryEvent::Clock(clock) => write!(f, "Clock({:.9})", clock.as_secs_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_from_secs_carries_rounded_nanoseconds() {
        let clock = ClockEvent::from_secs_f64(0.9999999999);
        assert_eq!(
            clock,
            ClockEvent {
                seconds: 1,
                nanoseconds: 0
            }
        );
    }

    #[test]
    fn clock_from_secs_splits_fraction() {
        let clock = ClockEvent::from_secs_f64(3.25);
        assert_eq!(clock.seconds, 3);
        assert_eq!(clock.nanoseconds, 250_000_000);
        assert_eq!(clock.as_secs_f64(), 3.25);
    }
}
