//! Mock implementations of the engine's trait seams for tests

use crate::collect::Collector;
use crate::dispatch::{AuditSink, Dispatcher, TerminationRecord};
use crate::domain::{CycleDigest, Observation, SourceKind};
use crate::error::{CollectError, DispatchError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Collector that replays a scripted sequence of per-cycle results
///
/// Each `collect` call pops the next step; when the script runs out it
/// keeps answering with an empty, successful report.
pub struct MockCollector {
    kind: SourceKind,
    name: String,
    script: Mutex<VecDeque<Result<Vec<Observation>, CollectError>>>,
    delay: Option<Duration>,
}

impl MockCollector {
    pub fn new(
        kind: SourceKind,
        name: impl Into<String>,
        script: Vec<Result<Vec<Observation>, CollectError>>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            script: Mutex::new(script.into()),
            delay: None,
        }
    }

    /// Make every collect call take at least this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Collector for MockCollector {
    fn source_kind(&self) -> SourceKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<Vec<Observation>, CollectError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.script.lock() {
            Ok(mut script) => script.pop_front().unwrap_or_else(|| Ok(Vec::new())),
            Err(_) => Ok(Vec::new()),
        }
    }
}

/// Dispatcher that records every digest it successfully receives
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    digests: Arc<Mutex<Vec<CycleDigest>>>,
    attempts: Arc<Mutex<u64>>,
    fail_remaining: Arc<Mutex<u64>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` dispatch calls fail
    pub fn fail_times(&self, n: u64) {
        if let Ok(mut remaining) = self.fail_remaining.lock() {
            *remaining = n;
        }
    }

    /// Total dispatch calls, failed ones included
    pub fn attempts(&self) -> u64 {
        self.attempts.lock().map(|a| *a).unwrap_or(0)
    }

    pub fn digests(&self) -> Vec<CycleDigest> {
        self.digests.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    fn dispatch(&self, digest: &CycleDigest) -> Result<(), DispatchError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            *attempts += 1;
        }
        if let Ok(mut remaining) = self.fail_remaining.lock() {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DispatchError::DeliveryFailed {
                    sink: "recording".to_string(),
                    message: "scripted failure".to_string(),
                });
            }
        }
        if let Ok(mut digests) = self.digests.lock() {
            digests.push(digest.clone());
        }
        Ok(())
    }
}

/// Audit sink that records termination records
#[derive(Clone, Default)]
pub struct RecordingAuditSink {
    records: Arc<Mutex<Vec<TerminationRecord>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TerminationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record_termination(&self, record: &TerminationRecord) -> Result<(), DispatchError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        Ok(())
    }
}
