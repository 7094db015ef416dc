//! Splunk HTTP Event Collector (HEC) client
//!
//! Builds the collector URI for a Splunk Cloud host and posts one JSON event per request.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::config::HecConfig;
use crate::error::{RelayError, Result};
use crate::models::{FeedElement, HecEvent};

/// Scheme used to reach the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Https,
    Http,
}

impl Protocol {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "https" => Ok(Protocol::Https),
            "http" => Ok(Protocol::Http),
            other => Err(RelayError::InvalidProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Https => write!(f, "https"),
            Protocol::Http => write!(f, "http"),
        }
    }
}

/// Options that shape the collector URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HecUriOptions {
    pub port: String,
    pub endpoint: String,
    pub protocol: String,
    pub trial_version: bool,
}

impl Default for HecUriOptions {
    fn default() -> Self {
        Self {
            port: "443".to_string(),
            endpoint: "services/collector".to_string(),
            protocol: "https".to_string(),
            trial_version: false,
        }
    }
}

impl From<&HecConfig> for HecUriOptions {
    fn from(config: &HecConfig) -> Self {
        Self {
            port: config.port.clone(),
            endpoint: config.endpoint.clone(),
            protocol: config.protocol.clone(),
            trial_version: config.trial_version,
        }
    }
}

/// Build `protocol://<prefix><host>:<port>/<endpoint>`.
///
/// Trial instances take inputs on `inputs.<host>:8088`; paid instances on
/// `http-inputs-<host>` at the requested port.
pub fn build_hec_uri(host_name: &str, options: &HecUriOptions) -> Result<String> {
    let protocol = Protocol::parse(&options.protocol)?;

    let (prefix, port) = if options.trial_version {
        ("inputs.", "8088")
    } else {
        ("http-inputs-", options.port.as_str())
    };

    Ok(format!(
        "{}://{}{}:{}/{}",
        protocol, prefix, host_name, port, options.endpoint
    ))
}

/// Posts events to one collector URI
pub struct HecClient {
    client: Client,
    uri: String,
}

impl HecClient {
    /// Create a client for `uri` authenticating with `token`.
    ///
    /// Certificate verification stays on unless `config.accept_invalid_certs` is set.
    pub fn new(uri: String, token: &str, config: &HecConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Splunk {}", token)).map_err(|_| {
            RelayError::InvalidConfig {
                name: "HEC_TOKEN",
                value: "<redacted>".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for HEC posts");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client, uri })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// POST one element wrapped in a `_json` envelope and return the collector's status.
    ///
    /// The response body is always drained so the pooled connection can be reused.
    pub async fn post_event(&self, index: &str, payload: &FeedElement) -> Result<StatusCode> {
        let event = HecEvent::new(index, payload);
        let response = self.client.post(&self.uri).json(&event).send().await?;
        let status = response.status();

        match response.text().await {
            Ok(body) => debug!("HEC answered {} for index {}: {}", status, index, body),
            Err(e) => debug!(
                "HEC answered {} for index {}, body unreadable: {}",
                status, index, e
            ),
        }

        Ok(status)
    }
}
