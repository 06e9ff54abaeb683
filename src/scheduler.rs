//! Cycle scheduling
//!
//! One logical loop drives every cycle: wait, collect, evaluate, update the
//! tracker, build and dispatch the digest. Only this loop touches tracker
//! state, so the engine needs no locking. Cancellation is cooperative
//! through an injectable [`StopSignal`]: a graceful stop finishes the
//! in-flight cycle and leaves a termination record, a forceful stop exits
//! without one.

use crate::collect::{collect_all, Collector};
use crate::dispatch::{AuditSink, Dispatcher, TerminationRecord};
use crate::domain::DigestBuilder;
use crate::error::Result;
use crate::rules::RuleEvaluator;
use crate::tracker::IssueTracker;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

const STATE_RUN: u8 = 0;
const STATE_GRACEFUL: u8 = 1;
const STATE_FORCEFUL: u8 = 2;

/// Granularity at which sleeps re-check the stop signal
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Requested stop mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopState {
    Run,
    Graceful,
    Forceful,
}

/// Injectable, cloneable cancellation signal
///
/// The process-signal plumbing that trips this lives outside the engine;
/// tests trip it directly.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Default)]
struct StopInner {
    state: AtomicU8,
    actor: Mutex<Option<String>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a graceful stop; the in-flight cycle finishes first.
    /// A forceful request already in place is not downgraded.
    pub fn request_graceful(&self, actor: Option<String>) {
        if let Ok(mut slot) = self.inner.actor.lock() {
            *slot = actor;
        }
        let _ = self.inner.state.compare_exchange(
            STATE_RUN,
            STATE_GRACEFUL,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Request an immediate stop; no termination record will be written
    pub fn request_forceful(&self) {
        self.inner.state.store(STATE_FORCEFUL, Ordering::SeqCst);
    }

    pub fn state(&self) -> StopState {
        match self.inner.state.load(Ordering::SeqCst) {
            STATE_GRACEFUL => StopState::Graceful,
            STATE_FORCEFUL => StopState::Forceful,
            _ => StopState::Run,
        }
    }

    fn actor(&self) -> Option<String> {
        self.inner.actor.lock().ok().and_then(|slot| slot.clone())
    }
}

/// Configuration for the cycle loop
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between cycle starts
    pub interval: Duration,
    /// Shared deadline for one cycle's collection
    pub collect_timeout: Duration,
    /// Stop after this many cycles (None = run until stopped)
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            collect_timeout: Duration::from_secs(30),
            max_cycles: None,
        }
    }
}

/// Drives the watcher: cadence, per-cycle isolation, shutdown semantics
pub struct CycleScheduler {
    config: SchedulerConfig,
    collectors: Vec<Arc<dyn Collector>>,
    evaluator: RuleEvaluator,
    tracker: IssueTracker,
    dispatcher: Box<dyn Dispatcher>,
    audit: Box<dyn AuditSink>,
    stop: StopSignal,
}

impl CycleScheduler {
    pub fn new(
        config: SchedulerConfig,
        collectors: Vec<Arc<dyn Collector>>,
        evaluator: RuleEvaluator,
        tracker: IssueTracker,
        dispatcher: Box<dyn Dispatcher>,
        audit: Box<dyn AuditSink>,
        stop: StopSignal,
    ) -> Self {
        Self {
            config,
            collectors,
            evaluator,
            tracker,
            dispatcher,
            audit,
            stop,
        }
    }

    /// Run the watcher loop until stopped or the cycle limit is reached
    pub fn run(&mut self) -> Result<()> {
        let mut cycle: u64 = 0;

        loop {
            match self.stop.state() {
                StopState::Forceful => return Ok(()),
                StopState::Graceful => {
                    self.emit_termination("graceful stop requested");
                    return Ok(());
                }
                StopState::Run => {}
            }

            cycle += 1;
            self.run_cycle(cycle);

            if let Some(max) = self.config.max_cycles {
                if cycle >= max {
                    self.emit_termination("cycle limit reached");
                    return Ok(());
                }
            }

            if !self.sleep_between_cycles() {
                // Forceful stop during the wait: exit without a record
                return Ok(());
            }
        }
    }

    fn run_cycle(&mut self, cycle: u64) {
        let started = Instant::now();
        log::debug!("Cycle {}: collecting from {} source(s)", cycle, self.collectors.len());

        let outcome = collect_all(&self.collectors, self.config.collect_timeout);
        let now = SystemTime::now();
        let findings = self.evaluator.evaluate(&outcome.observations, now);
        let decisions = self.tracker.update(&findings, &outcome.reported, cycle);

        if let Some(digest) = DigestBuilder::build(cycle, &decisions) {
            log::info!("Cycle {}: dispatching digest ({})", cycle, digest.summary());
            if let Err(e) = self.dispatcher.dispatch(&digest) {
                // No retry; the issue resurfaces on its normal schedule
                log::error!(
                    "Dispatch via '{}' failed: {}",
                    self.dispatcher.name(),
                    e
                );
            }
        }

        log::debug!(
            "Cycle {} complete in {:?}; {} issue(s) tracked",
            cycle,
            started.elapsed(),
            self.tracker.tracked()
        );
    }

    /// Sleep one interval, re-checking the stop signal.
    /// Returns false on a forceful stop.
    fn sleep_between_cycles(&self) -> bool {
        let wake_at = Instant::now() + self.config.interval;
        loop {
            match self.stop.state() {
                StopState::Forceful => return false,
                // Graceful is handled at the cycle boundary
                StopState::Graceful => return true,
                StopState::Run => {}
            }
            let remaining = wake_at.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }

    fn emit_termination(&self, reason: &str) {
        let mut record = TerminationRecord::now(reason);
        if let Some(actor) = self.stop.actor() {
            record.actor = Some(actor);
        }
        if let Err(e) = self.audit.record_termination(&record) {
            log::error!("Failed to write termination record: {}", e);
        }
    }
}
