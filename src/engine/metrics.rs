//! Periodic metrics computation over the accumulated history.

use std::fmt::Display;

use serde::Serialize;

use crate::{
    MonitorError,
    config::{Settings, Thresholds},
};

use super::{rate::RateEstimator, store::SampleStore};

/// Controller quality summary over the full history observed so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub max_pole_angle_deviation: f64,
    pub rms_cart_position: f64,
    pub peak_force: f64,
    pub efficiency_percent: f64,
    pub avg_recovery_time: Option<f64>,
    pub control_rate_hz: Option<f64>,
    pub rate_healthy: Option<bool>,
}

/// Turns a sample store into a [`Report`]; holds configuration only.
#[derive(Debug, Clone)]
pub struct MetricsComputer {
    thresholds: Thresholds,
    rate: RateEstimator,
}

impl MetricsComputer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            thresholds: settings.thresholds.clone(),
            rate: RateEstimator::new(settings.control_rate.clone()),
        }
    }

    /// Fails with [`MonitorError::InsufficientData`] until the angle, position
    /// and force series each hold the minimum sample count.
    pub fn compute(&self, store: &SampleStore) -> Result<Report, MonitorError> {
        let required = self.thresholds.min_samples;
        let angles = store.pole_angles();
        let positions = store.cart_positions();
        let forces = store.control_forces();
        if angles.len() < required || positions.len() < required || forces.len() < required {
            return Err(MonitorError::InsufficientData {
                angles: angles.len(),
                positions: positions.len(),
                forces: forces.len(),
                required,
            });
        }

        let max_pole_angle_deviation = max(angles);
        let rms_cart_position = mean(positions.iter().map(|p| p * p)).sqrt();
        let peak_force = max(forces);
        let efficiency_percent = efficiency(peak_force, self.thresholds.max_allowed_force);

        let recoveries = store.recovery_durations();
        let avg_recovery_time = if recoveries.is_empty() {
            None
        } else {
            Some(mean(recoveries.iter().copied()))
        };

        let estimate = self.rate.estimate(store.control_timestamps());

        Ok(Report {
            max_pole_angle_deviation,
            rms_cart_position,
            peak_force,
            efficiency_percent,
            avg_recovery_time,
            control_rate_hz: estimate.map(|e| e.hz),
            rate_healthy: estimate.map(|e| e.healthy),
        })
    }
}

/// Share of the force budget left unused, clamped to 0..=100.
pub fn efficiency(peak_force: f64, max_allowed_force: f64) -> f64 {
    ((1.0 - peak_force / max_allowed_force) * 100.0).clamp(0.0, 100.0)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let len = values.len();
    values.sum::<f64>() / len as f64
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Report(max_angle={:.4} rad, rms_position={:.4} m, peak_force={:.2} N, efficiency={:.2}%",
            self.max_pole_angle_deviation,
            self.rms_cart_position,
            self.peak_force,
            self.efficiency_percent
        )?;
        if let Some(recovery) = self.avg_recovery_time {
            write!(f, ", avg_recovery={recovery:.3} s")?;
        }
        if let Some(rate) = self.control_rate_hz {
            write!(f, ", control_rate={rate:.2} Hz")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_clamps_both_ends() {
        assert_eq!(efficiency(0.0, 250.0), 100.0);
        assert_eq!(efficiency(250.0, 250.0), 0.0);
        assert_eq!(efficiency(400.0, 250.0), 0.0);
        assert!((efficiency(125.0, 250.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn max_ignores_order() {
        assert_eq!(max(&[0.1, 0.7, 0.3]), 0.7);
    }

    #[test]
    fn display_omits_absent_fields() {
        let report = Report {
            max_pole_angle_deviation: 0.1,
            rms_cart_position: 0.2,
            peak_force: 10.0,
            efficiency_percent: 96.0,
            avg_recovery_time: None,
            control_rate_hz: None,
            rate_healthy: None,
        };
        let rendered = report.to_string();
        assert!(!rendered.contains("avg_recovery"));
        assert!(rendered.contains("efficiency=96.00%"));
    }
}
