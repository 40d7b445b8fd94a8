//! Bounded request dispatch
//!
//! The dispatcher walks a [`Schedule`] tick by tick, launching exactly the
//! scheduled number of request tasks per tick. Tasks are gated by a global
//! semaphore so no more than `max_concurrency` requests are ever in flight,
//! and every tick is re-anchored to wall-clock seconds: if a batch finishes
//! early the dispatcher sleeps out the remainder of the second, and if it
//! overruns the next tick starts immediately (overrun seconds are absorbed,
//! never redistributed as extra future load).
//!
//! Tick `t + 1` never starts before every task of tick `t` has completed, so
//! worst-case task count per tick is bounded by the tick's target while the
//! permit pool still enforces the cross-tick concurrency ceiling.

use crate::config::RequestSpec;
use crate::error::{Error, Result};
use crate::outcome::{OutcomeRecorder, RequestOutcome, ResultSet};
use crate::schedule::Schedule;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};

/// The externally supplied request-execution capability
///
/// Implementations issue one request and report whatever the transport
/// observed. The contract is infallible: transport errors are encoded as
/// failure outcomes, never propagated, so one failing endpoint cannot stall
/// the dispatch loop.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome;
}

/// Walks a schedule, driving concurrent request tasks
pub struct Dispatcher {
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Create a dispatcher with a global in-flight ceiling
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Run the full schedule against the executor
    ///
    /// Individual request failures are recorded and never abort the run. Only
    /// a fatal setup condition (closed permit pool, panicked batch task)
    /// surfaces as an error.
    pub async fn run<E>(
        &self,
        schedule: &Schedule,
        spec: RequestSpec,
        executor: Arc<E>,
    ) -> Result<ResultSet>
    where
        E: RequestExecutor + 'static,
    {
        let recorder = Arc::new(OutcomeRecorder::new());
        let spec = Arc::new(spec);

        for (tick, target) in schedule.ticks().enumerate() {
            let tick_start = Instant::now();

            if target == 0 {
                // Quiet second: advance the clock without an empty batch.
                sleep(Duration::from_secs(1)).await;
                continue;
            }

            let mut batch = JoinSet::new();
            for _ in 0..target {
                let permits = Arc::clone(&self.permits);
                let executor = Arc::clone(&executor);
                let recorder = Arc::clone(&recorder);
                let spec = Arc::clone(&spec);

                batch.spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::Dispatch(format!("permit pool closed: {e}")))?;
                    let outcome = executor.execute(&spec).await;
                    recorder.record(outcome);
                    Ok::<(), Error>(())
                    // permit released here, on success and failure alike
                });
            }

            while let Some(joined) = batch.join_next().await {
                joined.map_err(|e| Error::Dispatch(format!("batch task failed: {e}")))??;
            }

            tracing::debug!(tick, target, "tick batch complete");

            // Re-anchor to wall-clock seconds; overruns start the next tick
            // immediately.
            let elapsed = tick_start.elapsed();
            if elapsed < Duration::from_secs(1) {
                sleep(Duration::from_secs(1) - elapsed).await;
            }
        }

        Ok(recorder.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpMethod;
    use crate::outcome::RequestResult;
    use crate::schedule::{generate_schedule, LoadPattern};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spec() -> RequestSpec {
        RequestSpec {
            url: "http://localhost/".to_string(),
            method: HttpMethod::Get,
            body: None,
        }
    }

    /// Executor that tracks in-flight concurrency and fails every nth request
    struct ScriptedExecutor {
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        issued: AtomicUsize,
        fail_every: usize,
    }

    impl ScriptedExecutor {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                issued: AtomicUsize::new(0),
                fail_every: 0,
            }
        }

        fn failing_every(delay: Duration, n: usize) -> Self {
            Self { fail_every: n, ..Self::new(delay) }
        }
    }

    #[async_trait]
    impl RequestExecutor for ScriptedExecutor {
        async fn execute(&self, _spec: &RequestSpec) -> RequestOutcome {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

            let result = if self.fail_every != 0 && seq % self.fail_every == 0 {
                RequestResult::Status(500)
            } else {
                RequestResult::Status(200)
            };
            RequestOutcome { elapsed: self.delay, result }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_scheduled_request_completes() {
        let schedule = generate_schedule(&LoadPattern::Steady, 4, 3).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(Duration::from_millis(20)));

        let results = Dispatcher::new(10)
            .run(&schedule, spec(), Arc::clone(&executor))
            .await
            .unwrap();

        assert_eq!(results.total_requests() as u64, schedule.total_requests());
        assert!(results.failures.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_ceiling_enforced() {
        let schedule = generate_schedule(&LoadPattern::Steady, 20, 2).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(Duration::from_millis(50)));

        Dispatcher::new(3)
            .run(&schedule, spec(), Arc::clone(&executor))
            .await
            .unwrap();

        assert!(executor.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_recorded_not_fatal() {
        let schedule = generate_schedule(&LoadPattern::Steady, 5, 2).unwrap();
        let executor =
            Arc::new(ScriptedExecutor::failing_every(Duration::from_millis(10), 2));

        let results = Dispatcher::new(10)
            .run(&schedule, spec(), executor)
            .await
            .unwrap();

        assert_eq!(results.total_requests(), 10);
        assert_eq!(results.failures.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_anchored_to_seconds() {
        let schedule = generate_schedule(&LoadPattern::Steady, 1, 3).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(Duration::from_millis(100)));

        let start = Instant::now();
        Dispatcher::new(10).run(&schedule, spec(), executor).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(3), "paced run ended at {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3500), "pacing overshot: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_count_ticks_idle() {
        let schedule = generate_schedule(&LoadPattern::Steady, 0, 2).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(Duration::ZERO));

        let start = Instant::now();
        let results = Dispatcher::new(10)
            .run(&schedule, spec(), Arc::clone(&executor))
            .await
            .unwrap();

        assert_eq!(results.total_requests(), 0);
        assert_eq!(executor.issued.load(Ordering::SeqCst), 0);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrun_tick_starts_next_immediately() {
        // One request per tick, each taking 2s: every tick overruns and the
        // run must not stretch beyond the batches themselves.
        let schedule = generate_schedule(&LoadPattern::Steady, 1, 2).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(Duration::from_secs(2)));

        let start = Instant::now();
        Dispatcher::new(10).run(&schedule, spec(), executor).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_millis(4500), "no catch-up sleep expected: {elapsed:?}");
    }
}
