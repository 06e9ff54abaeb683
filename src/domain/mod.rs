//! Domain models for podwatch
//!
//! The data that flows through one monitoring cycle: observations in,
//! findings and notify decisions inside, a digest out. Issue state is the
//! only type here that survives across cycles.

pub mod digest;
pub mod finding;
pub mod issue;
pub mod observation;

pub use digest::{CycleDigest, DigestBuilder, DigestEntry};
pub use finding::{Finding, OccurrenceDetail, Severity};
pub use issue::{IssueState, IssueStatus, NotifyDecision, Transition};
pub use observation::{LogClass, LogScope, ObservedValue, Observation, SourceKind};
