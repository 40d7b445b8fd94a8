//! Configuration relay
//!
//! A minimal one-shot hand-off: runners connect, announce readiness, and the
//! coordinator answers each with one pending [`TestConfig`] in arrival order.
//! A runner that connects after the pool is drained gets a clean close and no
//! config. The relay never reports results back; the runner executes the
//! engine locally and reports locally.
//!
//! Wire format: one JSON object per direction per connection,
//! `{"status":"READY"}` then `{"command":"START","params":{...}}`, each at
//! most [`MAX_MESSAGE_BYTES`] long.

use crate::config::TestConfig;
use crate::error::{Error, Result};
use crate::schedule::LoadPattern;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Maximum wire message size in bytes
pub const MAX_MESSAGE_BYTES: usize = 1024;

const READY_STATUS: &str = "READY";
const START_COMMAND: &str = "START";

#[derive(Debug, Serialize, Deserialize)]
struct StatusMessage {
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StartCommand {
    command: String,
    params: TestConfig,
}

/// Coordinator side of the relay
///
/// Owns the pending-configuration pool explicitly; configs are handed out in
/// arrival order and never reassigned.
pub struct Coordinator {
    pending: Mutex<VecDeque<TestConfig>>,
}

impl Coordinator {
    pub fn new(configs: Vec<TestConfig>) -> Self {
        Self {
            pending: Mutex::new(configs.into()),
        }
    }

    /// Number of configurations not yet handed out
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Accept runner connections until the listener fails
    ///
    /// Each connection is served by its own task; a protocol error on one
    /// connection never takes the coordinator down.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::debug!(%peer, "runner connected");

            let coordinator = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = coordinator.handle_runner(stream).await {
                    tracing::warn!(%peer, error = %e, "runner connection failed");
                }
            });
        }
    }

    /// Serve one runner connection: READY in, at most one START out
    pub async fn handle_runner(&self, mut stream: TcpStream) -> Result<()> {
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }

        let message: StatusMessage = serde_json::from_slice(&buf[..n])?;
        if message.status != READY_STATUS {
            return Err(Error::Relay(format!(
                "unexpected status '{}' from runner",
                message.status
            )));
        }

        let config = self.pending.lock().unwrap().pop_front();
        match config {
            Some(params) => {
                let command = StartCommand { command: START_COMMAND.to_string(), params };
                stream.write_all(&serde_json::to_vec(&command)?).await?;
                stream.shutdown().await?;
                tracing::info!("configuration sent, closing connection");
            }
            None => {
                // Pool drained: clean close, not an error.
                tracing::info!("no more configurations available");
            }
        }
        Ok(())
    }
}

/// Runner side of the relay: announce READY and wait for one configuration
///
/// Returns `Ok(None)` when the coordinator closed without sending a config
/// (pool exhausted). The received config is validated here, before the caller
/// hands it to the engine.
pub async fn fetch_config(coordinator_addr: &str) -> Result<Option<TestConfig>> {
    let mut stream = TcpStream::connect(coordinator_addr).await?;
    tracing::info!(addr = coordinator_addr, "connected to coordinator");

    let ready = StatusMessage { status: READY_STATUS.to_string() };
    stream.write_all(&serde_json::to_vec(&ready)?).await?;

    let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }

    let command: StartCommand = serde_json::from_slice(&buf[..n])?;
    if command.command != START_COMMAND {
        return Err(Error::Relay(format!(
            "unexpected command '{}' from coordinator",
            command.command
        )));
    }

    command.params.validate()?;
    LoadPattern::from_config(&command.params)?;
    Ok(Some(command.params))
}
