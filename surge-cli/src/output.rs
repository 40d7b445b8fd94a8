//! Report output formatting

use anyhow::Result;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use surge_core::Report;

/// Render the report as the human-readable results block
pub fn render_human(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-------- Results --------");
    let _ = writeln!(out, "Total Requests: {}", report.total_requests);
    let _ = writeln!(out, "Total time: {:.4}s", report.total_time_secs);
    let _ = writeln!(
        out,
        "Average time per request / Latency: {:.4}s",
        report.avg_latency_secs
    );
    let _ = writeln!(out, "Fastest time: {:.4}s", report.min_latency_secs);
    let _ = writeln!(out, "Slowest time: {:.4}s", report.max_latency_secs);
    let _ = writeln!(out, "Amplitude: {:.4}s", report.amplitude_secs);
    let _ = writeln!(out, "Standard deviation: {:.6}", report.std_dev_secs);
    let _ = writeln!(out, "Requests Per Second: {:.2}", report.throughput_rps);
    let _ = writeln!(out, "Error Rate: {:.2}%", report.error_rate_pct);
    let _ = writeln!(out, "Response Time Percentiles:");
    let _ = writeln!(out, "  50th Percentile: {:.4}s", report.percentiles.p50);
    let _ = writeln!(out, "  75th Percentile: {:.4}s", report.percentiles.p75);
    let _ = writeln!(out, "  90th Percentile: {:.4}s", report.percentiles.p90);
    let _ = writeln!(out, "  95th Percentile: {:.4}s", report.percentiles.p95);
    let _ = writeln!(out, "  99th Percentile: {:.4}s", report.percentiles.p99);
    out
}

/// Print the results block to stdout
pub fn print_human(report: &Report) {
    print!("{}", render_human(report));
}

/// Write the report to a JSON file
pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
