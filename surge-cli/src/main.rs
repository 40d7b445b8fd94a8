use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use surge_core::relay::{fetch_config, Coordinator};
use surge_core::{run_load, TestConfig};

mod http;
mod output;

use http::HttpExecutor;

/// surge: asynchronous HTTP load tester
///
/// Drives synthetic traffic against a target URL following a load pattern
/// (steady, spike, or periodic), bounded by a global concurrency ceiling,
/// and reports latency and error statistics.
///
/// Example usage:
///   surge run https://example.com --qps 5 --duration 30 steady
///   surge run https://example.com --qps 5 spike --spike-load 50 --spike-duration 5
///   surge coordinator --port 8888 --config configs.json
///   surge runner --coordinator-host 10.0.0.1 --coordinator-port 8888
#[derive(Parser)]
#[command(name = "surge")]
#[command(version, about = "Asynchronous HTTP load tester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test locally
    Run(RunArgs),

    /// Serve pending test configurations to connecting runners
    Coordinator {
        /// Host to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8888)]
        port: u16,

        /// Path to a JSON file holding an array of test configurations
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },

    /// Fetch one configuration from a coordinator and execute it
    Runner {
        /// Host of the coordinator
        #[arg(long, default_value = "localhost")]
        coordinator_host: String,

        /// Port the coordinator is listening on
        #[arg(long, default_value_t = 8888)]
        coordinator_port: u16,

        /// Also write the report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// URL to test
    url: String,

    /// Queries per second
    #[arg(long, default_value_t = 1)]
    qps: u32,

    /// HTTP method to use for the requests
    #[arg(long, default_value = "GET")]
    method: String,

    /// JSON body to send with each request
    #[arg(long)]
    data: Option<String>,

    /// Duration of the test in seconds
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Maximum number of concurrent requests
    #[arg(short = 'c', long, default_value_t = 10)]
    concurrency: usize,

    /// Also write the report as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    pattern: PatternCommand,
}

#[derive(Subcommand)]
enum PatternCommand {
    /// Steady load pattern
    Steady,

    /// Spike load pattern
    Spike {
        /// Duration of the spike in seconds
        #[arg(long, default_value_t = 10)]
        spike_duration: u32,

        /// Request rate during the spike
        #[arg(long, default_value_t = 20)]
        spike_load: u32,
    },

    /// Periodic spike pattern
    Periodic {
        /// Interval between spike starts in seconds
        #[arg(long, default_value_t = 30)]
        spike_interval: u32,

        /// Duration of each spike in seconds
        #[arg(long, default_value_t = 5)]
        spike_duration: u32,

        /// Request rate during each spike
        #[arg(long, default_value_t = 20)]
        spike_load: u32,
    },
}

impl RunArgs {
    fn into_config(self) -> Result<(TestConfig, Option<PathBuf>)> {
        let method = self.method.parse().context("invalid --method")?;
        let body = self
            .data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("--data must be valid JSON")?;

        let (pattern, spike_duration, spike_load, spike_interval) = match self.pattern {
            PatternCommand::Steady => ("steady", None, None, None),
            PatternCommand::Spike { spike_duration, spike_load } => {
                ("spike", Some(spike_duration), Some(spike_load), None)
            }
            PatternCommand::Periodic { spike_interval, spike_duration, spike_load } => {
                ("periodic", Some(spike_duration), Some(spike_load), Some(spike_interval))
            }
        };

        let config = TestConfig {
            url: self.url,
            method,
            body,
            rate: self.qps,
            duration_secs: self.duration,
            concurrency: self.concurrency,
            pattern: pattern.to_string(),
            spike_duration,
            spike_load,
            spike_interval,
        };
        Ok((config, self.output))
    }
}

/// Load the coordinator's pending pool from a JSON file
fn load_configurations(path: &Path) -> Result<Vec<TestConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Probe the target, run the test, and emit the report
async fn execute_test(config: TestConfig, output: Option<PathBuf>) -> Result<()> {
    match http::fetch_server_info(&config.url).await {
        Ok(server) => {
            tracing::info!(%server, url = %config.url, "target server info");
        }
        Err(e) => {
            tracing::warn!(url = %config.url, error = %e, "server info probe failed");
        }
    }

    let executor = Arc::new(HttpExecutor::new()?);
    let report = run_load(&config, executor).await?;

    output::print_human(&report);
    if let Some(path) = output {
        output::write_json(&report, &path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run(args) => {
            let (config, output) = args.into_config()?;
            execute_test(config, output).await
        }
        Commands::Coordinator { host, port, config } => {
            let configs = load_configurations(&config)?;
            tracing::info!(
                count = configs.len(),
                "loaded pending configurations"
            );

            let listener = TcpListener::bind((host.as_str(), port))
                .await
                .with_context(|| format!("failed to bind {host}:{port}"))?;
            tracing::info!(%host, port, "coordinator running");

            let coordinator = Arc::new(Coordinator::new(configs));
            coordinator.serve(listener).await?;
            Ok(())
        }
        Commands::Runner { coordinator_host, coordinator_port, output } => {
            let addr = format!("{coordinator_host}:{coordinator_port}");
            match fetch_config(&addr).await? {
                Some(config) => {
                    tracing::info!(
                        url = %config.url,
                        pattern = %config.pattern,
                        "received configuration from coordinator"
                    );
                    execute_test(config, output).await
                }
                None => {
                    tracing::info!("coordinator had no configuration for this runner");
                    Ok(())
                }
            }
        }
    }
}
