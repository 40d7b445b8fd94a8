//! Request outcomes and their concurrent accumulation
//!
//! Dispatcher tasks complete in arbitrary interleavings; the
//! [`OutcomeRecorder`] absorbs them with no lost updates. Ordering between
//! entries is unspecified, so only unordered statistics are computed from a
//! [`ResultSet`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// What came back for one request attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestResult {
    /// The transport completed and produced an HTTP status code
    Status(u16),
    /// The transport failed before a status was available
    TransportError(String),
}

impl fmt::Display for RequestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestResult::Status(code) => write!(f, "status {code}"),
            RequestResult::TransportError(msg) => write!(f, "{msg}"),
        }
    }
}

/// The result of one completed request attempt
///
/// Created once by a dispatcher task and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// Wall-clock time the attempt took, as reported by the transport
    pub elapsed: Duration,
    pub result: RequestResult,
}

impl RequestOutcome {
    /// A request counts as failed on any transport error or HTTP status >= 400
    pub fn is_failure(&self) -> bool {
        match &self.result {
            RequestResult::Status(code) => *code >= 400,
            RequestResult::TransportError(_) => true,
        }
    }
}

/// The accumulated sequences of a finished run
///
/// `latencies` holds one entry per completed attempt; `failures` holds the
/// result of each failed attempt, so `failures.len() <= latencies.len()`.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub latencies: Vec<Duration>,
    pub failures: Vec<RequestResult>,
}

impl ResultSet {
    pub fn total_requests(&self) -> usize {
        self.latencies.len()
    }
}

/// Task-safe accumulator for request outcomes
///
/// `record` tolerates arbitrary interleaving from concurrently completing
/// tasks. `snapshot` is meaningful only after all dispatch tasks finished.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    results: Mutex<ResultSet>,
}

impl OutcomeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome
    pub fn record(&self, outcome: RequestOutcome) {
        let mut results = self.results.lock().unwrap();
        results.latencies.push(outcome.elapsed);
        if outcome.is_failure() {
            results.failures.push(outcome.result);
        }
    }

    /// The accumulated sequences so far
    pub fn snapshot(&self) -> ResultSet {
        self.results.lock().unwrap().clone()
    }
}
