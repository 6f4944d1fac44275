//! Event handlers translating raw telemetry into sample store mutations.

use tracing::{info, warn};

use crate::{
    ClockEvent, DisturbanceEvent, ForceEvent, MonitorError, StateEvent,
    config::{ChannelNames, Thresholds},
};

use super::store::SampleStore;

/// Values extracted from a state event once both channels resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointReading {
    pub cart_position: f64,
    pub cart_velocity: f64,
    pub pole_angle: f64,
}

/// What a successfully applied state event produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateOutcome {
    pub boundary_violation: bool,
    pub recovery: Option<f64>,
}

/// Resolves the cart and pole channels of a state event without mutating anything.
pub fn resolve_joints(
    event: &StateEvent,
    channels: &ChannelNames,
) -> Result<JointReading, MonitorError> {
    let cart = lookup(event, &channels.cart)?;
    let pole = lookup(event, &channels.pole)?;

    let cart_position = sample(&event.positions, cart, "position", &channels.cart)?;
    let cart_velocity = sample(&event.velocities, cart, "velocity", &channels.cart)?;
    let pole_angle = sample(&event.positions, pole, "position", &channels.pole)?;

    Ok(JointReading {
        cart_position,
        cart_velocity,
        pole_angle,
    })
}

fn lookup(event: &StateEvent, name: &str) -> Result<usize, MonitorError> {
    event
        .channel_index(name)
        .ok_or_else(|| MonitorError::MissingChannel {
            name: name.to_string(),
        })
}

fn sample(values: &[f64], index: usize, field: &str, name: &str) -> Result<f64, MonitorError> {
    values.get(index).copied().ok_or_else(|| {
        MonitorError::MalformedState(format!(
            "channel '{name}' at index {index} has no {field} (only {} values)",
            values.len()
        ))
    })
}

/// Applies a joint state event. On error the store is left untouched.
pub fn apply_state(
    store: &mut SampleStore,
    event: &StateEvent,
    channels: &ChannelNames,
    thresholds: &Thresholds,
) -> Result<StateOutcome, MonitorError> {
    let reading = resolve_joints(event, channels)?;

    store.push_state(reading.cart_position, reading.pole_angle.abs());

    let boundary_violation = reading.cart_position.abs() > thresholds.cart_position_limit;
    if boundary_violation {
        warn!(
            cart_position = %format!("{:.3}", reading.cart_position),
            limit = thresholds.cart_position_limit,
            "cart exceeded position limit"
        );
    }

    let now = store.simulation_time();
    let recovery = store.recovery_mut().observe(
        now,
        reading.cart_velocity.abs(),
        thresholds.stability_velocity,
    );
    if let Some(duration) = recovery {
        store.push_recovery(duration);
    }

    Ok(StateOutcome {
        boundary_violation,
        recovery,
    })
}

/// Records the magnitude of a commanded force stamped with the current clock.
pub fn apply_force(store: &mut SampleStore, event: &ForceEvent) {
    store.push_force(event.value.abs());
}

/// Opens (or re-arms) the disturbance window when the magnitude is large
/// enough. Returns whether a window was opened.
pub fn apply_disturbance(
    store: &mut SampleStore,
    event: &DisturbanceEvent,
    thresholds: &Thresholds,
) -> bool {
    if event.value.abs() <= thresholds.disturbance_magnitude {
        return false;
    }
    let now = store.simulation_time();
    store.recovery_mut().arm(now);
    info!(
        magnitude = event.value,
        at = now,
        "disturbance detected"
    );
    true
}

/// Overwrites the simulation clock.
pub fn apply_clock(store: &mut SampleStore, event: &ClockEvent) {
    store.set_simulation_time(event.as_secs_f64());
}
