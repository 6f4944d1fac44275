//! Disturbance-to-stability recovery tracking.

use tracing::info;

/// Two-state recovery machine. `Disturbed` holds the simulation time at which
/// the live disturbance was detected.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RecoveryState {
    #[default]
    Idle,
    Disturbed { started_at: f64 },
}

/// Tracks at most one outstanding disturbance window.
#[derive(Debug, Clone, Default)]
pub struct RecoveryDetector {
    state: RecoveryState,
}

impl RecoveryDetector {
    pub fn state(&self) -> RecoveryState {
        self.state
    }

    pub fn is_disturbed(&self) -> bool {
        matches!(self.state, RecoveryState::Disturbed { .. })
    }

    /// Start time of the live disturbance window, if any.
    pub fn window_start(&self) -> Option<f64> {
        match self.state {
            RecoveryState::Idle => None,
            RecoveryState::Disturbed { started_at } => Some(started_at),
        }
    }

    /// Opens a disturbance window at `now`. An unresolved window is replaced
    /// and never recorded.
    pub fn arm(&mut self, now: f64) {
        if let Some(previous) = self.window_start() {
            info!(
                previous_start = previous,
                start = now,
                "disturbance re-armed before recovery"
            );
        }
        self.state = RecoveryState::Disturbed { started_at: now };
    }

    /// Feeds a cart velocity magnitude observed at `now`. Returns the recovery
    /// duration when this observation closes the live window.
    pub fn observe(&mut self, now: f64, velocity_magnitude: f64, threshold: f64) -> Option<f64> {
        let RecoveryState::Disturbed { started_at } = self.state else {
            return None;
        };
        if velocity_magnitude >= threshold {
            return None;
        }
        self.state = RecoveryState::Idle;
        let duration = now - started_at;
        info!(recovery_secs = %format!("{duration:.3}"), "recovery time");
        Some(duration)
    }
}
