//! Control-rate estimation from the force sample timestamps.

use crate::config::ControlRateBand;

/// Estimated control rate and its classification against the target band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Scaled rate in Hz.
    pub hz: f64,
    pub healthy: bool,
}

/// Stateless estimator over the control timestamp series.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    band: ControlRateBand,
}

impl RateEstimator {
    pub fn new(band: ControlRateBand) -> Self {
        Self { band }
    }

    /// Inverts the mean spacing of consecutive timestamps and applies the
    /// configured scale divisor. Absent with fewer than two timestamps or
    /// when the mean spacing is zero. A clock that jumped backwards gives a
    /// negative rate, which falls outside the band.
    pub fn estimate(&self, timestamps: &[f64]) -> Option<RateEstimate> {
        let mean_interval = mean_interval(timestamps)?;
        if mean_interval == 0.0 || !mean_interval.is_finite() {
            return None;
        }
        let hz = (1.0 / mean_interval) / self.band.scale_divisor;
        Some(RateEstimate {
            hz,
            healthy: self.classify(hz),
        })
    }

    /// Whether a scaled rate lies inside the inclusive target band.
    pub fn classify(&self, hz: f64) -> bool {
        self.band.target_min_hz <= hz && hz <= self.band.target_max_hz
    }
}

fn mean_interval(timestamps: &[f64]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }
    let total: f64 = timestamps.windows(2).map(|pair| pair[1] - pair[0]).sum();
    Some(total / (timestamps.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> RateEstimator {
        RateEstimator::new(ControlRateBand::default())
    }

    #[test]
    fn fewer_than_two_timestamps_is_absent() {
        assert_eq!(estimator().estimate(&[]), None);
        assert_eq!(estimator().estimate(&[1.0]), None);
    }

    #[test]
    fn identical_timestamps_are_absent() {
        assert_eq!(estimator().estimate(&[2.0, 2.0, 2.0]), None);
    }

    #[test]
    fn two_hundred_hz_samples_scale_into_band() {
        let timestamps: Vec<f64> = (0..50).map(|i| i as f64 * 0.005).collect();
        let estimate = estimator().estimate(&timestamps).expect("estimate");
        assert!((estimate.hz - 50.0).abs() < 1e-6);
        assert!(estimate.healthy);
    }

    #[test]
    fn clock_reset_gives_negative_out_of_band_rate() {
        let mut timestamps: Vec<f64> = (0..10).map(|i| 10.0 + i as f64 * 0.005).collect();
        timestamps.push(0.0);
        let estimate = estimator().estimate(&timestamps).expect("estimate");
        assert!((estimate.hz + 0.25).abs() < 1e-9);
        assert!(!estimate.healthy);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let estimator = estimator();
        assert!(estimator.classify(40.0));
        assert!(estimator.classify(70.0));
        assert!(!estimator.classify(39.99));
        assert!(!estimator.classify(70.01));
    }
}
