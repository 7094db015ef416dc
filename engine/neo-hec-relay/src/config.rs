use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};
use crate::models::{FlattenMode, MAX_WINDOW_DAYS};

pub const DEFAULT_NEO_API_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed";
pub const DEFAULT_HEC_INDEX: &str = "nasa_neo";

/// Configuration for the NEO relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// NASA NEO feed configuration
    pub neo: NeoFeedConfig,

    /// HTTP Event Collector configuration
    pub hec: HecConfig,

    /// Date range and target index for the run
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeoFeedConfig {
    /// Feed endpoint, without query string
    pub base_url: String,

    /// NASA API key
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HecConfig {
    /// Splunk Cloud instance name, without the inputs prefix
    pub host_name: Option<String>,

    /// HEC token sent as `Authorization: Splunk <token>`
    pub token: Option<String>,

    /// Full collector URI; skips building one from `host_name`
    pub uri_override: Option<String>,

    /// Collector port, ignored on trial instances
    pub port: String,

    /// Collector endpoint path
    pub endpoint: String,

    /// "https" or "http"
    pub protocol: String,

    /// Free trial Splunk Cloud instance
    pub trial_version: bool,

    /// Skip TLS certificate verification on posts
    pub accept_invalid_certs: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// First date fetched
    pub start_date: NaiveDate,

    /// Last date fetched (inclusive)
    pub end_date: NaiveDate,

    /// Days added to a window start to get its end
    pub window_days: i64,

    /// Splunk index events are written to
    pub index: String,

    /// How feed dates and records are flattened into events
    pub flatten_mode: FlattenMode,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            neo: NeoFeedConfig {
                base_url: DEFAULT_NEO_API_BASE_URL.to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            hec: HecConfig {
                host_name: None,
                token: None,
                uri_override: None,
                port: "443".to_string(),
                endpoint: "services/collector".to_string(),
                protocol: "https".to_string(),
                trial_version: true,
                accept_invalid_certs: false,
                timeout_secs: 30,
            },
            run: RunConfig {
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default(),
                window_days: MAX_WINDOW_DAYS,
                index: DEFAULT_HEC_INDEX.to_string(),
                flatten_mode: FlattenMode::Interleaved,
            },
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Credentials are not checked here; a missing key, host or token fails when first used.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.neo.api_key = std::env::var("NASA_API_KEY").ok();
        config.hec.host_name = std::env::var("SPLUNK_HOST_NAME").ok();
        config.hec.token = std::env::var("HEC_TOKEN").ok();
        config.hec.uri_override = std::env::var("HEC_URI").ok();

        if let Ok(base_url) = std::env::var("NEO_API_BASE_URL") {
            config.neo.base_url = base_url;
        }

        if let Ok(port) = std::env::var("HEC_PORT") {
            config.hec.port = port;
        }

        if let Ok(endpoint) = std::env::var("HEC_ENDPOINT") {
            config.hec.endpoint = endpoint;
        }

        if let Ok(protocol) = std::env::var("HEC_PROTOCOL") {
            config.hec.protocol = protocol;
        }

        if let Ok(index) = std::env::var("HEC_INDEX") {
            config.run.index = index;
        }

        if let Ok(value) = std::env::var("SPLUNK_TRIAL_VERSION") {
            config.hec.trial_version = parse_bool("SPLUNK_TRIAL_VERSION", &value)?;
        }

        if let Ok(value) = std::env::var("HEC_ACCEPT_INVALID_CERTS") {
            config.hec.accept_invalid_certs =
                parse_bool("HEC_ACCEPT_INVALID_CERTS", &value)?;
        }

        Ok(config)
    }

    /// NASA API key
    pub fn api_key(&self) -> Result<&str> {
        self.neo
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingConfig("NASA_API_KEY"))
    }

    /// Splunk host name
    pub fn host_name(&self) -> Result<&str> {
        self.hec
            .host_name
            .as_deref()
            .ok_or(RelayError::MissingConfig("SPLUNK_HOST_NAME"))
    }

    /// HEC token
    pub fn hec_token(&self) -> Result<&str> {
        self.hec
            .token
            .as_deref()
            .ok_or(RelayError::MissingConfig("HEC_TOKEN"))
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RelayError::InvalidConfig {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELAY_ENV: [&str; 11] = [
        "NASA_API_KEY",
        "SPLUNK_HOST_NAME",
        "HEC_TOKEN",
        "HEC_URI",
        "NEO_API_BASE_URL",
        "HEC_PORT",
        "HEC_ENDPOINT",
        "HEC_PROTOCOL",
        "HEC_INDEX",
        "SPLUNK_TRIAL_VERSION",
        "HEC_ACCEPT_INVALID_CERTS",
    ];

    fn clear_relay_env() {
        for name in RELAY_ENV {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_run_covers_2020() {
        let config = RelayConfig::default();
        assert_eq!(config.run.start_date.to_string(), "2020-01-01");
        assert_eq!(config.run.end_date.to_string(), "2020-12-31");
        assert_eq!(config.run.window_days, 7);
        assert_eq!(config.run.index, "nasa_neo");
        assert!(config.hec.trial_version);
        assert!(!config.hec.accept_invalid_certs);
    }

    #[test]
    fn test_missing_credentials_fail_on_use() {
        let config = RelayConfig::default();
        assert!(matches!(
            config.api_key(),
            Err(RelayError::MissingConfig("NASA_API_KEY"))
        ));
        assert!(matches!(
            config.host_name(),
            Err(RelayError::MissingConfig("SPLUNK_HOST_NAME"))
        ));
        assert!(matches!(
            config.hec_token(),
            Err(RelayError::MissingConfig("HEC_TOKEN"))
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(matches!(
            parse_bool("X", "maybe"),
            Err(RelayError::InvalidConfig { .. })
        ));
    }

    // Sole test that touches the process environment; add env cases here, not in new tests.
    #[test]
    fn test_from_env_reads_every_variable() {
        clear_relay_env();

        let config = RelayConfig::from_env().unwrap();
        assert_eq!(config.neo.base_url, DEFAULT_NEO_API_BASE_URL);
        assert_eq!(config.neo.api_key, None);
        assert_eq!(config.hec.host_name, None);
        assert_eq!(config.hec.token, None);
        assert_eq!(config.hec.uri_override, None);
        assert_eq!(config.hec.port, "443");
        assert_eq!(config.hec.endpoint, "services/collector");
        assert_eq!(config.hec.protocol, "https");
        assert_eq!(config.run.index, DEFAULT_HEC_INDEX);
        assert!(config.hec.trial_version);
        assert!(!config.hec.accept_invalid_certs);

        std::env::set_var("NASA_API_KEY", "DEMO_KEY");
        std::env::set_var("SPLUNK_HOST_NAME", "prd-p-abc.splunkcloud.com");
        std::env::set_var("HEC_TOKEN", "11111111-2222");
        std::env::set_var("HEC_URI", "http://localhost:8088/services/collector");
        std::env::set_var("NEO_API_BASE_URL", "http://localhost:9000/feed");
        std::env::set_var("HEC_PORT", "9443");
        std::env::set_var("HEC_ENDPOINT", "services/collector/event");
        std::env::set_var("HEC_PROTOCOL", "http");
        std::env::set_var("HEC_INDEX", "neo_test");
        std::env::set_var("SPLUNK_TRIAL_VERSION", "false");
        std::env::set_var("HEC_ACCEPT_INVALID_CERTS", "yes");

        let config = RelayConfig::from_env().unwrap();
        assert_eq!(config.api_key().unwrap(), "DEMO_KEY");
        assert_eq!(config.host_name().unwrap(), "prd-p-abc.splunkcloud.com");
        assert_eq!(config.hec_token().unwrap(), "11111111-2222");
        assert_eq!(
            config.hec.uri_override.as_deref(),
            Some("http://localhost:8088/services/collector")
        );
        assert_eq!(config.neo.base_url, "http://localhost:9000/feed");
        assert_eq!(config.hec.port, "9443");
        assert_eq!(config.hec.endpoint, "services/collector/event");
        assert_eq!(config.hec.protocol, "http");
        assert_eq!(config.run.index, "neo_test");
        assert!(!config.hec.trial_version);
        assert!(config.hec.accept_invalid_certs);

        std::env::set_var("SPLUNK_TRIAL_VERSION", "sometimes");
        match RelayConfig::from_env() {
            Err(RelayError::InvalidConfig { name, value }) => {
                assert_eq!(name, "SPLUNK_TRIAL_VERSION");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected invalid config, got {:?}", other),
        }

        clear_relay_env();
    }
}
