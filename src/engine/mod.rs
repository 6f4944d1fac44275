//! Event aggregation engine: sample storage, ingest handlers, recovery
//! tracking and metrics computation.

pub mod aggregator;
pub mod ingest;
pub mod metrics;
pub mod rate;
pub mod recovery;
pub mod reporter;
pub mod store;
