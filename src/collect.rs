//! Observation collection
//!
//! Collectors are the seam to the outside world (Kubernetes API, log scans,
//! filesystem probes). The engine only sees the trait: each cycle every
//! collector is asked once, in parallel, under a shared deadline. A source
//! that fails or overruns is skipped for that cycle and its kind is left out
//! of the reported set, which keeps the tracker from mistaking data loss for
//! recovery.

use crate::domain::{Observation, SourceKind};
use crate::error::CollectError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

/// One source of observations
pub trait Collector: Send + Sync {
    /// The source kind this collector reports for
    fn source_kind(&self) -> SourceKind;

    /// Collector name for logging
    fn name(&self) -> &str;

    /// Produce this cycle's observations
    fn collect(&self) -> Result<Vec<Observation>, CollectError>;
}

/// The joined result of one cycle's collection
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    /// All observations from sources that answered in time
    pub observations: Vec<Observation>,
    /// Source kinds where every collector of that kind produced a
    /// definitive result this cycle. "No observation available" (absent
    /// here) and "observed: healthy" (present, possibly with zero
    /// observations) are distinct signals; one failed collector withholds
    /// its whole kind so none of the kind's issues can falsely resolve.
    pub reported: BTreeSet<SourceKind>,
}

/// Run all collectors concurrently and join under one deadline
///
/// Collectors that are still running when the deadline passes are abandoned;
/// their threads finish in the background and their late results are
/// discarded with the channel.
pub fn collect_all(collectors: &[Arc<dyn Collector>], deadline: Duration) -> CollectionOutcome {
    let mut outcome = CollectionOutcome::default();
    if collectors.is_empty() {
        return outcome;
    }

    let mut expected: BTreeMap<SourceKind, usize> = BTreeMap::new();
    for collector in collectors {
        *expected.entry(collector.source_kind()).or_insert(0) += 1;
    }
    let mut succeeded: BTreeMap<SourceKind, usize> = BTreeMap::new();

    let (tx, rx) = mpsc::channel();
    for collector in collectors {
        let tx = tx.clone();
        let collector = Arc::clone(collector);
        thread::spawn(move || {
            let result = collector.collect();
            let _ = tx.send((
                collector.source_kind(),
                collector.name().to_string(),
                result,
            ));
        });
    }
    drop(tx);

    let deadline_at = Instant::now() + deadline;
    let mut pending: Vec<&str> = collectors.iter().map(|c| c.name()).collect();

    while !pending.is_empty() {
        let remaining = deadline_at.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((kind, name, result)) => {
                pending.retain(|n| *n != name);
                match result {
                    Ok(observations) => {
                        log::debug!(
                            "Collector '{}' reported {} observation(s)",
                            name,
                            observations.len()
                        );
                        outcome.observations.extend(observations);
                        *succeeded.entry(kind).or_insert(0) += 1;
                    }
                    Err(e) => {
                        log::warn!("Collector '{}' failed, skipping for this cycle: {}", name, e);
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                for name in &pending {
                    log::warn!(
                        "Collector '{}' exceeded the {:?} deadline, abandoning for this cycle",
                        name,
                        deadline
                    );
                }
                break;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    outcome.reported = expected
        .into_iter()
        .filter(|(kind, total)| succeeded.get(kind) == Some(total))
        .map(|(kind, _)| kind)
        .collect();

    outcome
}

/// Reachability probe for a mounted network path
///
/// A path counts as reachable when its metadata answers and, for
/// directories, a listing can be started. A hung mount makes these calls
/// block, which is exactly what the collection deadline is for.
pub struct PathProbeCollector {
    path: String,
}

impl PathProbeCollector {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Collector for PathProbeCollector {
    fn source_kind(&self) -> SourceKind {
        SourceKind::NetworkPath
    }

    fn name(&self) -> &str {
        "path-probe"
    }

    fn collect(&self) -> Result<Vec<Observation>, CollectError> {
        let now = SystemTime::now();
        let path = Path::new(&self.path);
        let reachable = match path.metadata() {
            Ok(meta) => {
                if meta.is_dir() {
                    std::fs::read_dir(path).is_ok()
                } else {
                    true
                }
            }
            Err(_) => false,
        };
        Ok(vec![Observation::path_reachability(
            &self.path, reachable, now,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObservedValue;
    use crate::mock::MockCollector;

    #[test]
    fn test_collect_all_empty() {
        let outcome = collect_all(&[], Duration::from_millis(100));
        assert!(outcome.observations.is_empty());
        assert!(outcome.reported.is_empty());
    }

    #[test]
    fn test_collect_all_joins_results() {
        let collectors: Vec<Arc<dyn Collector>> = vec![
            Arc::new(MockCollector::new(
                SourceKind::PodStatus,
                "pods",
                vec![Ok(vec![Observation::pod_status(
                    "default",
                    "api-0",
                    "Running",
                    SystemTime::now(),
                )])],
            )),
            Arc::new(MockCollector::new(SourceKind::NetworkPath, "paths", vec![Ok(vec![])])),
        ];

        let outcome = collect_all(&collectors, Duration::from_secs(5));
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(outcome.reported.len(), 2);
        assert!(outcome.reported.contains(&SourceKind::NetworkPath));
    }

    #[test]
    fn test_failed_collector_not_reported() {
        let collectors: Vec<Arc<dyn Collector>> = vec![Arc::new(MockCollector::new(
            SourceKind::PodLogs,
            "logs",
            vec![Err(CollectError::Unavailable {
                collector: "logs".to_string(),
                message: "api unreachable".to_string(),
            })],
        ))];

        let outcome = collect_all(&collectors, Duration::from_secs(5));
        assert!(outcome.observations.is_empty());
        assert!(!outcome.reported.contains(&SourceKind::PodLogs));
    }

    #[test]
    fn test_failed_collector_withholds_its_whole_kind() {
        // Two log collectors (targeted and global scan); the failing one
        // must keep PodLogs out of the reported set even though its peer
        // succeeded, so the failed side's issues cannot falsely resolve
        let collectors: Vec<Arc<dyn Collector>> = vec![
            Arc::new(MockCollector::new(
                SourceKind::PodLogs,
                "target-logs",
                vec![Err(CollectError::Unavailable {
                    collector: "target-logs".to_string(),
                    message: "api unreachable".to_string(),
                })],
            )),
            Arc::new(MockCollector::new(SourceKind::PodLogs, "global-scan", vec![Ok(vec![])])),
            Arc::new(MockCollector::new(SourceKind::NetworkPath, "paths", vec![Ok(vec![])])),
        ];

        let outcome = collect_all(&collectors, Duration::from_secs(5));
        assert!(!outcome.reported.contains(&SourceKind::PodLogs));
        assert!(outcome.reported.contains(&SourceKind::NetworkPath));

        // Next cycle both log collectors answer; the kind reports again
        let outcome = collect_all(&collectors, Duration::from_secs(5));
        assert!(outcome.reported.contains(&SourceKind::PodLogs));
    }

    #[test]
    fn test_slow_collector_abandoned_at_deadline() {
        let collectors: Vec<Arc<dyn Collector>> = vec![
            Arc::new(
                MockCollector::new(SourceKind::PodStatus, "slow", vec![Ok(vec![])])
                    .with_delay(Duration::from_millis(500)),
            ),
            Arc::new(MockCollector::new(SourceKind::NetworkPath, "fast", vec![Ok(vec![])])),
        ];

        let outcome = collect_all(&collectors, Duration::from_millis(50));
        assert!(outcome.reported.contains(&SourceKind::NetworkPath));
        assert!(!outcome.reported.contains(&SourceKind::PodStatus));
    }

    #[test]
    fn test_path_probe_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let probe = PathProbeCollector::new(dir.path().display().to_string());

        let observations = probe.collect().unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].value, ObservedValue::Reachable(true));
    }

    #[test]
    fn test_path_probe_missing_path() {
        let probe = PathProbeCollector::new("/definitely/not/a/real/path");
        let observations = probe.collect().unwrap();
        assert_eq!(observations[0].value, ObservedValue::Reachable(false));
    }
}
