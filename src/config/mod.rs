//! Configuration loading and validation utilities.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use serde::Deserialize;
use tokio::fs;
use tracing::instrument;

use crate::MonitorError;

/// Command-line arguments used to bootstrap the runtime.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Cart-pole controller performance monitor")]
pub struct CliArgs {
    /// Location of the monitor configuration document.
    #[arg(long, value_name = "PATH", default_value = "monitor.toml")]
    pub config: PathBuf,
    /// JSON-lines event replay; `-` or omitted reads stdin.
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,
    /// Report period override.
    #[arg(long, value_name = "SECONDS", env = "CARTPOLE_REPORT_PERIOD_SECS")]
    pub report_period_secs: Option<f64>,
    /// Bounded event channel capacity override.
    #[arg(long, value_name = "CAPACITY", env = "CARTPOLE_CHANNEL_CAPACITY")]
    pub channel_capacity: Option<u32>,
}

/// Detection and scoring thresholds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub cart_position_limit: f64,
    pub stability_velocity: f64,
    pub disturbance_magnitude: f64,
    pub max_allowed_force: f64,
    pub min_samples: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cart_position_limit: 2.5,
            stability_velocity: 0.05,
            disturbance_magnitude: 5.0,
            max_allowed_force: 250.0,
            min_samples: 10,
        }
    }
}

/// Control-rate scaling and the band considered healthy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlRateBand {
    pub scale_divisor: f64,
    pub target_min_hz: f64,
    pub target_max_hz: f64,
}

impl Default for ControlRateBand {
    fn default() -> Self {
        Self {
            scale_divisor: 4.0,
            target_min_hz: 40.0,
            target_max_hz: 70.0,
        }
    }
}

/// Joint names looked up in every state event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelNames {
    pub cart: String,
    pub pole: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            cart: "cart_to_base".to_string(),
            pole: "pole_joint".to_string(),
        }
    }
}

/// Everything the aggregation engine needs to interpret events.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub control_rate: ControlRateBand,
    #[serde(default)]
    pub channels: ChannelNames,
}

impl Settings {
    pub fn validate(&self) -> Result<(), MonitorError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("cart_position_limit", t.cart_position_limit),
            ("stability_velocity", t.stability_velocity),
            ("disturbance_magnitude", t.disturbance_magnitude),
            ("max_allowed_force", t.max_allowed_force),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MonitorError::Config(format!(
                    "threshold {name} must be positive, got {value}"
                )));
            }
        }
        if t.min_samples == 0 {
            return Err(MonitorError::Config(
                "min_samples must be at least 1".to_string(),
            ));
        }

        let band = &self.control_rate;
        if !(band.scale_divisor.is_finite() && band.scale_divisor > 0.0) {
            return Err(MonitorError::Config(format!(
                "control rate scale divisor must be positive, got {}",
                band.scale_divisor
            )));
        }
        if !(band.target_min_hz.is_finite()
            && band.target_max_hz.is_finite()
            && band.target_min_hz <= band.target_max_hz)
        {
            return Err(MonitorError::Config(format!(
                "control rate band [{}, {}] is invalid",
                band.target_min_hz, band.target_max_hz
            )));
        }

        if self.channels.cart.is_empty() || self.channels.pole.is_empty() {
            return Err(MonitorError::Config(
                "channel names must not be empty".to_string(),
            ));
        }
        if self.channels.cart == self.channels.pole {
            return Err(MonitorError::Config(format!(
                "cart and pole channels must differ, both are '{}'",
                self.channels.cart
            )));
        }
        Ok(())
    }
}

/// Runtime defaults provided by the configuration document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeDefaults {
    pub report_period_secs: f64,
    pub channel_capacity: u32,
}

impl Default for RuntimeDefaults {
    fn default() -> Self {
        Self {
            report_period_secs: 5.0,
            channel_capacity: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
struct MonitorDocument {
    #[serde(flatten)]
    settings: Settings,
    #[serde(default)]
    runtime: RuntimeDefaults,
}

/// Derived runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub report_period: Duration,
    pub channel_capacity: u32,
}

/// Fully merged configuration set.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cli: CliArgs,
    pub settings: Settings,
    pub runtime: RuntimeConfig,
    pub events: Option<PathBuf>,
}

impl AppConfig {
    #[instrument(skip_all)]
    pub async fn load(cli: CliArgs) -> Result<Self, MonitorError> {
        let raw = fs::read_to_string(&cli.config)
            .await
            .map_err(|err| MonitorError::Config(format!("failed to read config: {err}")))?;
        Self::from_document(cli, &raw)
    }

    /// Merges a configuration document with command-line overrides.
    pub fn from_document(cli: CliArgs, raw: &str) -> Result<Self, MonitorError> {
        let document: MonitorDocument = toml::from_str(raw)
            .map_err(|err| MonitorError::Config(format!("invalid config document: {err}")))?;
        document.settings.validate()?;

        let report_period_secs = cli
            .report_period_secs
            .unwrap_or(document.runtime.report_period_secs);
        if !(report_period_secs.is_finite() && report_period_secs > 0.0) {
            return Err(MonitorError::Config(format!(
                "report period must be positive, got {report_period_secs}s"
            )));
        }
        let channel_capacity = cli
            .channel_capacity
            .unwrap_or(document.runtime.channel_capacity)
            .max(1);

        let events = cli
            .events
            .clone()
            .filter(|path| path.as_os_str() != "-");

        Ok(Self {
            settings: document.settings,
            runtime: RuntimeConfig {
                report_period: Duration::from_secs_f64(report_period_secs),
                channel_capacity,
            },
            events,
            cli,
        })
    }
}
