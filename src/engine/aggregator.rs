//! Single-writer aggregator serialising every ingest and metrics read.

use std::sync::{Arc, Mutex};

use tracing::{instrument, warn};

use crate::{
    ClockEvent, DisturbanceEvent, ForceEvent, MonitorError, StateEvent, TelemetryEvent,
    config::Settings,
};

use super::{
    ingest::{self, StateOutcome},
    metrics::{MetricsComputer, Report},
    store::{SampleStore, StoreCounts},
};

/// Cloneable handle over the shared sample store. All handlers and the
/// periodic reader go through the same mutex.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<Mutex<SampleStore>>,
    settings: Arc<Settings>,
    metrics: MetricsComputer,
}

impl Aggregator {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: Arc::new(Mutex::new(SampleStore::new())),
            metrics: MetricsComputer::new(&settings),
            settings: Arc::new(settings),
        }
    }

    /// Dispatches an event to its handler, logging and dropping malformed state.
    pub fn ingest(&self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::State(state) => {
                if let Err(error) = self.on_state(state) {
                    warn!(error = %error, "dropping joint state");
                }
            }
            TelemetryEvent::Force(force) => self.on_force(force),
            TelemetryEvent::Disturbance(disturbance) => {
                self.on_disturbance(disturbance);
            }
            TelemetryEvent::Clock(clock) => self.on_clock(clock),
        }
    }

    pub fn on_state(&self, event: &StateEvent) -> Result<StateOutcome, MonitorError> {
        let mut store = self.store.lock().expect("sample store mutex poisoned");
        ingest::apply_state(
            &mut store,
            event,
            &self.settings.channels,
            &self.settings.thresholds,
        )
    }

    pub fn on_force(&self, event: &ForceEvent) {
        let mut store = self.store.lock().expect("sample store mutex poisoned");
        ingest::apply_force(&mut store, event);
    }

    pub fn on_disturbance(&self, event: &DisturbanceEvent) -> bool {
        let mut store = self.store.lock().expect("sample store mutex poisoned");
        ingest::apply_disturbance(&mut store, event, &self.settings.thresholds)
    }

    pub fn on_clock(&self, event: &ClockEvent) {
        let mut store = self.store.lock().expect("sample store mutex poisoned");
        ingest::apply_clock(&mut store, event);
    }

    /// Computes a report from the history so far.
    pub fn compute(&self) -> Result<Report, MonitorError> {
        let store = self.store.lock().expect("sample store mutex poisoned");
        self.metrics.compute(&store)
    }

    /// Periodic entry point: insufficient data is logged and yields no report.
    #[instrument(skip_all)]
    pub fn report(&self) -> Option<Report> {
        match self.compute() {
            Ok(report) => Some(report),
            Err(error) => {
                warn!(error = %error, "waiting for more samples");
                None
            }
        }
    }

    pub fn counts(&self) -> StoreCounts {
        self.store
            .lock()
            .expect("sample store mutex poisoned")
            .counts()
    }

    /// Runs `read` against the store under the lock.
    pub fn with_store<R>(&self, read: impl FnOnce(&SampleStore) -> R) -> R {
        let store = self.store.lock().expect("sample store mutex poisoned");
        read(&store)
    }
}
