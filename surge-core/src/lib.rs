//! surge core library
//!
//! The load-generation engine behind the `surge` CLI: schedule generation,
//! bounded concurrent dispatch, outcome recording, statistics aggregation,
//! and the one-shot coordinator/runner configuration relay. The HTTP
//! transport itself is supplied by the caller as a [`RequestExecutor`].

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod relay;
pub mod schedule;
pub mod stats;

pub use config::{HttpMethod, RequestSpec, TestConfig};
pub use dispatch::{Dispatcher, RequestExecutor};
pub use engine::run_load;
pub use error::{Error, Result};
pub use outcome::{OutcomeRecorder, RequestOutcome, RequestResult, ResultSet};
pub use schedule::{generate_schedule, LoadPattern, Schedule};
pub use stats::{summarize, Percentiles, Report};
