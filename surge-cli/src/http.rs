//! HTTP request execution over reqwest
//!
//! This is the transport side of the engine boundary: one [`HttpExecutor`]
//! per run, implementing [`RequestExecutor`] by issuing real requests and
//! folding every transport error into a failure outcome. The engine never
//! sees a transport error as an `Err`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Instant;
use surge_core::{HttpMethod, RequestExecutor, RequestOutcome, RequestResult, RequestSpec};

pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome {
        let start = Instant::now();

        let mut request = self.client.request(to_reqwest_method(spec.method), &spec.url);
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let outcome = match request.send().await {
            Ok(response) => RequestOutcome {
                elapsed: start.elapsed(),
                result: RequestResult::Status(response.status().as_u16()),
            },
            Err(e) => RequestOutcome {
                elapsed: start.elapsed(),
                result: RequestResult::TransportError(e.to_string()),
            },
        };

        tracing::trace!(
            elapsed_secs = outcome.elapsed.as_secs_f64(),
            result = %outcome.result,
            "request completed"
        );
        outcome
    }
}

/// Probe the target once and report its `Server` response header
pub async fn fetch_server_info(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to reach {url}"))?;
    let server = response
        .headers()
        .get("server")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    Ok(server)
}
