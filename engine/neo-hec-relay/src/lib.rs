//! NEO to HEC Relay
//!
//! Pulls Near-Earth-Object records from NASA's NeoWs feed in windows of up to seven days
//! and posts each one as an event to a Splunk HTTP Event Collector.

pub mod config;
pub mod error;
pub mod feed;
pub mod hec;
pub mod models;
pub mod relay;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use feed::{build_neo_url, flatten_feed, NeoFeedClient};
pub use hec::{build_hec_uri, HecClient, HecUriOptions, Protocol};
pub use models::*;
pub use relay::{plan_windows, NeoHecRelay};
