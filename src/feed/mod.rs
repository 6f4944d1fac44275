//! Event delivery, ingest and periodic reporting tasks.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    MonitorError, TelemetryEvent,
    config::RuntimeConfig,
    engine::{aggregator::Aggregator, reporter::Reporter},
};

pub mod replay;

/// Sender type alias for the event feed.
pub type EventSender = mpsc::Sender<TelemetryEvent>;
/// Receiver type alias for the event feed.
pub type EventReceiver = mpsc::Receiver<TelemetryEvent>;

/// Creates the bounded channel connecting an event source to the ingest task.
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Totals gathered over one monitor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorSummary {
    pub events_forwarded: u64,
    pub events_ingested: u64,
    pub reports_published: u64,
}

/// Spawns the task applying every received event to the aggregator.
pub fn spawn_ingest(
    aggregator: Aggregator,
    mut input: EventReceiver,
) -> JoinHandle<Result<u64, MonitorError>> {
    tokio::spawn(async move {
        let mut ingested = 0u64;
        while let Some(event) = input.recv().await {
            debug!(target = "feed", kind = event.kind(), event = %event, "event received");
            aggregator.ingest(&event);
            ingested += 1;
        }
        Ok(ingested)
    })
}

/// Spawns the periodic report task. The first report is attempted one full
/// period after start; a final one is attempted when `shutdown` fires or its
/// sender is dropped.
pub fn spawn_reporter(
    aggregator: Aggregator,
    reporter: Arc<dyn Reporter>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) -> JoinHandle<Result<u64, MonitorError>> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut published = 0u64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    published += publish_once(&aggregator, reporter.as_ref()).await;
                }
                _ = &mut shutdown => {
                    published += publish_once(&aggregator, reporter.as_ref()).await;
                    break;
                }
            }
        }
        Ok(published)
    })
}

async fn publish_once(aggregator: &Aggregator, reporter: &dyn Reporter) -> u64 {
    let Some(report) = aggregator.report() else {
        return 0;
    };
    match reporter.publish(&report).await {
        Ok(()) => 1,
        Err(error) => {
            warn!(target = "feed", error = %error, "report sink rejected report");
            0
        }
    }
}

/// Runs a source to exhaustion while ingesting and reporting concurrently.
#[instrument(skip_all)]
pub async fn execute_monitor<R: Reporter + 'static>(
    runtime: RuntimeConfig,
    aggregator: Aggregator,
    source: replay::ReplaySource,
    reporter: R,
) -> Result<MonitorSummary, MonitorError> {
    let (event_tx, event_rx) = channel(runtime.channel_capacity as usize);
    let (stop_tx, stop_rx) = oneshot::channel();

    let source_handle = source.spawn(event_tx);
    let ingest_handle = spawn_ingest(aggregator.clone(), event_rx);
    let reporter_handle = spawn_reporter(
        aggregator.clone(),
        Arc::new(reporter),
        runtime.report_period,
        stop_rx,
    );

    let forwarded = source_handle.await.map_err(MonitorError::from)?;
    let ingested = ingest_handle.await.map_err(MonitorError::from)?;
    if stop_tx.send(()).is_err() {
        warn!(target = "feed", "report task ended before shutdown");
    }
    let published = reporter_handle.await.map_err(MonitorError::from)??;

    let summary = MonitorSummary {
        events_forwarded: forwarded?,
        events_ingested: ingested?,
        reports_published: published,
    };
    info!(
        forwarded = summary.events_forwarded,
        ingested = summary.events_ingested,
        reports = summary.reports_published,
        "event feed exhausted"
    );
    Ok(summary)
}
