//! Execution report types.
//!
//! An ExecutionReport records, in order, what an executor did with each
//! objective it visited while resolving one root objective.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::ObjectiveStatus;

/// Record of one executor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Unique identifier for this run.
    pub id: Uuid,

    /// Hash of the root objective.
    pub root_hash: String,

    /// Label of the root objective.
    pub root_label: String,

    /// Events in the order objectives were settled.
    pub events: Vec<ExecutionEvent>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished, if it did.
    pub finished_at: Option<DateTime<Utc>>,

    /// Running digest over the events, in order.
    pub trace_digest: String,

    /// Sum of the durations of achieved objectives, in milliseconds.
    pub total_duration_ms: u64,
}

/// What happened to a single objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Hash of the objective.
    pub hash: String,

    /// Label of the objective.
    pub label: String,

    /// Outcome for this objective.
    pub status: ObjectiveStatus,

    /// Whether the objective asked to be surfaced in progress output.
    pub notable: bool,

    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,

    /// Time spent in `achieve`, for achieved objectives.
    pub duration_ms: Option<u64>,
}

/// Digest of a report with no events.
const EMPTY_TRACE: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Extend `previous` with one event: SHA-256 over the previous digest and
/// the hash of the event's JSON form.
fn chain_digest(previous: &str, event: &ExecutionEvent) -> String {
    let json = serde_json::to_vec(event).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(Sha256::digest(&json));
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

impl ExecutionReport {
    /// Start a report for the given root objective.
    pub fn new(root_hash: impl Into<String>, root_label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            root_hash: root_hash.into(),
            root_label: root_label.into(),
            events: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            trace_digest: EMPTY_TRACE.to_string(),
            total_duration_ms: 0,
        }
    }

    /// Append an event to the report, folding it into the trace digest.
    pub fn add_event(&mut self, event: ExecutionEvent) {
        if let Some(duration) = event.duration_ms {
            self.total_duration_ms += duration;
        }
        self.trace_digest = chain_digest(&self.trace_digest, &event);
        self.events.push(event);
    }

    /// Mark the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Recompute the trace digest from the events.
    pub fn compute_trace_digest(&self) -> String {
        self.events
            .iter()
            .fold(EMPTY_TRACE.to_string(), |digest, event| chain_digest(&digest, event))
    }

    /// Verify the stored digest matches the events.
    pub fn verify_trace_digest(&self) -> bool {
        self.trace_digest == self.compute_trace_digest()
    }

    /// Events with the given status, in order.
    pub fn with_status(&self, status: ObjectiveStatus) -> Vec<&ExecutionEvent> {
        self.events.iter().filter(|e| e.status == status).collect()
    }

    /// Labels of the objectives achieved during this run, in order.
    pub fn achieved_labels(&self) -> Vec<&str> {
        self.with_status(ObjectiveStatus::Achieved)
            .into_iter()
            .map(|e| e.label.as_str())
            .collect()
    }

    /// Returns true if nothing had to be achieved.
    pub fn is_noop(&self) -> bool {
        self.events
            .iter()
            .all(|e| e.status != ObjectiveStatus::Achieved)
    }
}

impl ExecutionEvent {
    fn new(hash: String, label: String, status: ObjectiveStatus, notable: bool) -> Self {
        Self {
            hash,
            label,
            status,
            notable,
            timestamp: Utc::now(),
            duration_ms: None,
        }
    }

    /// An objective achieved during the run.
    pub fn achieved(
        hash: impl Into<String>,
        label: impl Into<String>,
        notable: bool,
        duration_ms: u64,
    ) -> Self {
        let mut event = Self::new(hash.into(), label.into(), ObjectiveStatus::Achieved, notable);
        event.duration_ms = Some(duration_ms);
        event
    }

    /// An objective that was already achieved.
    pub fn skipped(hash: impl Into<String>, label: impl Into<String>, notable: bool) -> Self {
        Self::new(hash.into(), label.into(), ObjectiveStatus::Skipped, notable)
    }

    /// An objective listed by a dry run.
    pub fn planned(hash: impl Into<String>, label: impl Into<String>, notable: bool) -> Self {
        Self::new(hash.into(), label.into(), ObjectiveStatus::Planned, notable)
    }
}
