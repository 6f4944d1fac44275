//! Sinks receiving computed reports.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::MonitorError;

use super::metrics::Report;

/// Trait implemented by report consumers.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn publish(&self, report: &Report) -> Result<(), MonitorError>;
}

/// Renders reports as human-readable log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

#[async_trait]
impl Reporter for LogReporter {
    async fn publish(&self, report: &Report) -> Result<(), MonitorError> {
        info!("performance metrics");
        info!(
            "max pole angle deviation: {:.4} rad",
            report.max_pole_angle_deviation
        );
        info!("rms cart position error: {:.4} m", report.rms_cart_position);
        info!("peak control force used: {:.2} N", report.peak_force);
        info!(
            "control effort efficiency: {:.2}%",
            report.efficiency_percent
        );
        match report.avg_recovery_time {
            Some(recovery) => info!("average recovery time: {recovery:.3} sec"),
            None => info!("no recovery data recorded"),
        }
        match (report.control_rate_hz, report.rate_healthy) {
            (Some(rate), Some(true)) => info!("control rate: {rate:.2} Hz - meets target band"),
            (Some(rate), _) => info!("control rate: {rate:.2} Hz - outside target band"),
            (None, _) => info!("control rate: not enough data to compute"),
        }
        Ok(())
    }
}

/// Keeps every published report in shared memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl MemoryReporter {
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .expect("report buffer mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl Reporter for MemoryReporter {
    async fn publish(&self, report: &Report) -> Result<(), MonitorError> {
        self.reports
            .lock()
            .map_err(|_| MonitorError::Publish("report buffer mutex poisoned".to_string()))?
            .push(report.clone());
        Ok(())
    }
}
