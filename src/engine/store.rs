//! Append-only sample storage shared by the ingest handlers and the metrics reader.

use super::recovery::RecoveryDetector;

/// Lengths of every series plus the disturbance state, suitable for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub pole_angles: usize,
    pub cart_positions: usize,
    pub control_forces: usize,
    pub control_timestamps: usize,
    pub recovery_durations: usize,
    pub disturbance_live: bool,
}

/// Accumulated history of the observed control loop.
///
/// Series only ever grow; nothing is removed or rewritten once appended.
/// `control_forces` and `control_timestamps` are pushed together and always
/// have the same length.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    pole_angles: Vec<f64>,
    cart_positions: Vec<f64>,
    control_forces: Vec<f64>,
    control_timestamps: Vec<f64>,
    recovery_durations: Vec<f64>,
    simulation_time: f64,
    recovery: RecoveryDetector,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pole_angles(&self) -> &[f64] {
        &self.pole_angles
    }

    pub fn cart_positions(&self) -> &[f64] {
        &self.cart_positions
    }

    pub fn control_forces(&self) -> &[f64] {
        &self.control_forces
    }

    pub fn control_timestamps(&self) -> &[f64] {
        &self.control_timestamps
    }

    pub fn recovery_durations(&self) -> &[f64] {
        &self.recovery_durations
    }

    /// Most recent simulation clock value received.
    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn recovery(&self) -> &RecoveryDetector {
        &self.recovery
    }

    pub(crate) fn recovery_mut(&mut self) -> &mut RecoveryDetector {
        &mut self.recovery
    }

    pub(crate) fn set_simulation_time(&mut self, time: f64) {
        self.simulation_time = time;
    }

    pub(crate) fn push_state(&mut self, cart_position: f64, pole_angle_magnitude: f64) {
        self.cart_positions.push(cart_position);
        self.pole_angles.push(pole_angle_magnitude);
    }

    pub(crate) fn push_force(&mut self, force_magnitude: f64) {
        self.control_forces.push(force_magnitude);
        self.control_timestamps.push(self.simulation_time);
    }

    pub(crate) fn push_recovery(&mut self, duration: f64) {
        self.recovery_durations.push(duration);
    }

    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            pole_angles: self.pole_angles.len(),
            cart_positions: self.cart_positions.len(),
            control_forces: self.control_forces.len(),
            control_timestamps: self.control_timestamps.len(),
            recovery_durations: self.recovery_durations.len(),
            disturbance_live: self.recovery.is_disturbed(),
        }
    }
}
