//! Test configuration types
//!
//! A [`TestConfig`] fully describes one load test: the target, the base rate,
//! the duration, the concurrency ceiling, and the load pattern. It is built by
//! the CLI or received over the configuration relay, and is never mutated by
//! the engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP method used for every request of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(Error::Config(format!("unknown HTTP method '{other}'"))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete configuration for one load test
///
/// All optional fields have documented defaults so that a config received over
/// the relay wire can omit them. Spike parameters are only consulted for the
/// `spike` and `periodic` patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Target URL
    pub url: String,
    /// HTTP method (default: GET)
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    /// Optional JSON body sent with each request
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// Base rate in requests per second (default: 1)
    #[serde(default = "default_rate")]
    pub rate: u32,
    /// Test duration in seconds (default: 10)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,
    /// Maximum number of concurrent in-flight requests (default: 10)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Load pattern tag: "steady", "spike", or "periodic" (default: steady)
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Spike length in seconds (default: 10)
    #[serde(default)]
    pub spike_duration: Option<u32>,
    /// Rate during a spike, in requests per second (default: 20)
    #[serde(default)]
    pub spike_load: Option<u32>,
    /// Seconds between spike starts for the periodic pattern (default: 30)
    #[serde(default)]
    pub spike_interval: Option<u32>,
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

fn default_rate() -> u32 {
    1
}

fn default_duration() -> u64 {
    10
}

fn default_concurrency() -> usize {
    10
}

fn default_pattern() -> String {
    "steady".to_string()
}

impl TestConfig {
    /// Validate scalar fields
    ///
    /// Pattern-specific parameters are validated when the pattern is resolved
    /// (see `LoadPattern::from_config`), before any request is issued.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::Config("target URL cannot be empty".to_string()));
        }
        if self.rate == 0 {
            return Err(Error::Config("rate must be > 0".to_string()));
        }
        if self.duration_secs == 0 {
            return Err(Error::Config("duration must be > 0".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be > 0".to_string()));
        }
        Ok(())
    }

    /// The per-request view handed to the request executor
    pub fn request_spec(&self) -> RequestSpec {
        RequestSpec {
            url: self.url.clone(),
            method: self.method,
            body: self.body.clone(),
        }
    }
}

/// Everything the request executor needs to issue one request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<serde_json::Value>,
}
