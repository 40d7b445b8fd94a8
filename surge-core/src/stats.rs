//! Statistics aggregation
//!
//! [`summarize`] turns the raw result sequences of a run into the final
//! report. It is a pure function of the result set and the test duration:
//! no clock reads, no scheduling dependency.

use crate::outcome::ResultSet;
use serde::{Deserialize, Serialize};

/// Latency percentile ladder, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Summary report of one load test run
///
/// Every field is defined (as 0) for a run with zero completed requests; an
/// empty run must never surface NaN or a division fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_requests: usize,
    /// Sum of all request latencies, in seconds
    pub total_time_secs: f64,
    pub avg_latency_secs: f64,
    pub min_latency_secs: f64,
    pub max_latency_secs: f64,
    /// max - min
    pub amplitude_secs: f64,
    /// Population standard deviation of latencies
    pub std_dev_secs: f64,
    /// Completed requests divided by the test duration
    pub throughput_rps: f64,
    /// Failed requests as a percentage of all completed requests
    pub error_rate_pct: f64,
    pub percentiles: Percentiles,
}

impl Report {
    fn empty() -> Self {
        Self {
            total_requests: 0,
            total_time_secs: 0.0,
            avg_latency_secs: 0.0,
            min_latency_secs: 0.0,
            max_latency_secs: 0.0,
            amplitude_secs: 0.0,
            std_dev_secs: 0.0,
            throughput_rps: 0.0,
            error_rate_pct: 0.0,
            percentiles: Percentiles { p50: 0.0, p75: 0.0, p90: 0.0, p95: 0.0, p99: 0.0 },
        }
    }
}

/// Calculate a percentile from sorted samples
///
/// Uses linear interpolation between order statistics (rank = p * (n - 1)),
/// not nearest-rank. `percentile` is in [0.0, 1.0].
fn calculate_percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if percentile <= 0.0 {
        return sorted[0];
    }
    if percentile >= 1.0 {
        return sorted[sorted.len() - 1];
    }

    let rank = percentile * (sorted.len() - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        return sorted[lower_idx];
    }

    let fraction = rank - lower_idx as f64;
    sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * fraction
}

/// Aggregate a result set into the summary report
pub fn summarize(results: &ResultSet, duration_secs: f64) -> Report {
    let total_requests = results.total_requests();
    if total_requests == 0 {
        return Report::empty();
    }

    let mut sorted: Vec<f64> =
        results.latencies.iter().map(|d| d.as_secs_f64()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let total_time = sorted.iter().sum::<f64>();
    let avg = total_time / n;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let variance = sorted.iter().map(|&s| (s - avg) * (s - avg)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let throughput = if duration_secs > 0.0 {
        total_requests as f64 / duration_secs
    } else {
        0.0
    };
    let error_rate = results.failures.len() as f64 / n * 100.0;

    Report {
        total_requests,
        total_time_secs: total_time,
        avg_latency_secs: avg,
        min_latency_secs: min,
        max_latency_secs: max,
        amplitude_secs: max - min,
        std_dev_secs: std_dev,
        throughput_rps: throughput,
        error_rate_pct: error_rate,
        percentiles: Percentiles {
            p50: calculate_percentile(&sorted, 0.50),
            p75: calculate_percentile(&sorted, 0.75),
            p90: calculate_percentile(&sorted, 0.90),
            p95: calculate_percentile(&sorted, 0.95),
            p99: calculate_percentile(&sorted, 0.99),
        },
    }
}
