//! JSON-lines replay standing in for the live event transport.

use std::path::PathBuf;

use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tracing::{instrument, warn};

use crate::{MonitorError, TelemetryEvent};

use super::EventSender;

/// Where replayed events come from.
#[derive(Debug, Clone)]
pub enum ReplaySource {
    Stdin,
    File(PathBuf),
    Memory(Vec<TelemetryEvent>),
}

impl ReplaySource {
    /// File when a path is given, stdin otherwise.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(path),
            None => Self::Stdin,
        }
    }

    /// Spawns the task forwarding decoded events; resolves to the number forwarded.
    pub fn spawn(self, output: EventSender) -> JoinHandle<Result<u64, MonitorError>> {
        tokio::spawn(async move {
            match self {
                ReplaySource::Stdin => pump_lines(BufReader::new(io::stdin()), output).await,
                ReplaySource::File(path) => {
                    let file = File::open(&path).await.map_err(|err| {
                        MonitorError::Io(format!("failed to open {}: {err}", path.display()))
                    })?;
                    pump_lines(BufReader::new(file), output).await
                }
                ReplaySource::Memory(events) => {
                    let mut forwarded = 0u64;
                    for event in events {
                        if output.send(event).await.is_err() {
                            warn!(target = "feed", "ingest dropped");
                            break;
                        }
                        forwarded += 1;
                    }
                    Ok(forwarded)
                }
            }
        })
    }
}

/// Decodes one JSON event per line. Blank lines are ignored and undecodable
/// lines are skipped.
pub fn decode_line(line: &str) -> Result<Option<TelemetryEvent>, MonitorError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|err| MonitorError::Decode(err.to_string()))
}

#[instrument(skip_all)]
async fn pump_lines<R>(reader: R, output: EventSender) -> Result<u64, MonitorError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0u64;
    let mut forwarded = 0u64;
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| MonitorError::Io(err.to_string()))?
    {
        line_number += 1;
        let event = match decode_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(error) => {
                warn!(target = "feed", line = line_number, error = %error, "skipping event");
                continue;
            }
        };
        if output.send(event).await.is_err() {
            warn!(target = "feed", "ingest dropped");
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}
