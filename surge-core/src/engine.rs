//! Engine entry point
//!
//! Wires the pieces together for one run: validate the config, resolve the
//! pattern, generate the schedule, dispatch, summarize. Schedule-construction
//! errors abort here, before a single request is issued.

use crate::config::TestConfig;
use crate::dispatch::{Dispatcher, RequestExecutor};
use crate::error::Result;
use crate::schedule::{generate_schedule, LoadPattern};
use crate::stats::{summarize, Report};
use std::sync::Arc;

/// Run one complete load test against the given request executor
pub async fn run_load<E>(config: &TestConfig, executor: Arc<E>) -> Result<Report>
where
    E: RequestExecutor + 'static,
{
    config.validate()?;

    let pattern = LoadPattern::from_config(config)?;
    let schedule = generate_schedule(&pattern, config.rate, config.duration_secs)?;
    tracing::debug!(schedule = ?schedule.as_slice(), "load schedule computed");
    tracing::info!(
        url = %config.url,
        method = %config.method,
        pattern = %config.pattern,
        rate = config.rate,
        duration_secs = config.duration_secs,
        concurrency = config.concurrency,
        total_requests = schedule.total_requests(),
        "starting load test"
    );

    let dispatcher = Dispatcher::new(config.concurrency);
    let results = dispatcher.run(&schedule, config.request_spec(), executor).await?;

    Ok(summarize(&results, config.duration_secs as f64))
}
