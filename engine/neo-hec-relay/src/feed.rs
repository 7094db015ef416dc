use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{DateWindow, FeedElement, FeedResponse, FlattenMode};

/// Build the feed URL for one date window.
///
/// `end` must fall 0 to 7 days after `start`.
pub fn build_neo_url(
    base_url: &str,
    api_key: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<String> {
    let window = DateWindow::new(start, end)?;
    Ok(window_url(base_url, api_key, &window))
}

/// Feed URL for an already validated window
pub fn window_url(base_url: &str, api_key: &str, window: &DateWindow) -> String {
    format!(
        "{}?start_date={}&end_date={}&detailed=true&api_key={}",
        base_url,
        window.start().format("%Y-%m-%d"),
        window.end().format("%Y-%m-%d"),
        api_key
    )
}

/// Turn the date-keyed mapping into the sequence of events to post
pub fn flatten_feed(feed: FeedResponse, mode: FlattenMode) -> Vec<FeedElement> {
    let mut elements = Vec::with_capacity(feed.days().len() + feed.record_count());

    for day in feed.into_days() {
        if mode == FlattenMode::Interleaved {
            elements.push(FeedElement::Date(day.date));
        }
        elements.extend(day.records.into_iter().map(FeedElement::Record));
    }

    elements
}

/// Client for the NASA NEO feed
pub struct NeoFeedClient {
    client: Client,
}

impl NeoFeedClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// GET a feed URL and extract its `near_earth_objects` mapping
    pub async fn fetch(&self, url: &str) -> Result<FeedResponse> {
        debug!("Fetching NEO feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("NEO feed answered with status: {}", status);
        }

        let body: Value = response.json().await?;
        let feed = FeedResponse::from_body(body, status.as_u16())?;

        info!(
            "Fetched {} NEOs across {} dates",
            feed.record_count(),
            feed.days().len()
        );
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::models::{FeedDay, NeoRecord};
    use serde_json::json;

    const BASE: &str = "https://api.nasa.gov/neo/rest/v1/feed";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: &str) -> NeoRecord {
        let mut record = NeoRecord::new();
        record.insert("id".to_string(), json!(id));
        record
    }

    #[test]
    fn test_build_neo_url() {
        let url = build_neo_url(BASE, "DEMO_KEY", date("2020-01-01"), date("2020-01-08")).unwrap();
        assert_eq!(
            url,
            "https://api.nasa.gov/neo/rest/v1/feed?start_date=2020-01-01&end_date=2020-01-08\
             &detailed=true&api_key=DEMO_KEY"
        );
    }

    #[test]
    fn test_build_neo_url_every_valid_span() {
        let start = date("2020-02-26");
        for days in 0..=7 {
            let end = start + chrono::Duration::days(days);
            let url = build_neo_url(BASE, "k3y", start, end).unwrap();
            assert!(url.contains("start_date=2020-02-26"));
            assert!(url.contains(&format!("end_date={}", end.format("%Y-%m-%d"))));
            assert!(url.contains("api_key=k3y"));
        }
    }

    #[test]
    fn test_build_neo_url_rejects_bad_spans() {
        let start = date("2020-01-10");
        for end in [date("2020-01-09"), date("2020-01-18"), date("2020-03-01")] {
            let err = build_neo_url(BASE, "k3y", start, end).unwrap_err();
            assert!(matches!(err, RelayError::InvalidDateWindow { .. }));
            assert!(err.to_string().contains("within 0 and 7 days"));
        }
    }

    #[test]
    fn test_flatten_interleaves_dates() {
        let feed = FeedResponse::new(vec![
            FeedDay {
                date: "2020-01-01".to_string(),
                records: vec![record("A"), record("B")],
            },
            FeedDay {
                date: "2020-01-02".to_string(),
                records: vec![record("C")],
            },
        ]);
        let expected_records = feed.record_count();

        let elements = flatten_feed(feed, FlattenMode::Interleaved);
        assert_eq!(
            elements,
            vec![
                FeedElement::Date("2020-01-01".to_string()),
                FeedElement::Record(record("A")),
                FeedElement::Record(record("B")),
                FeedElement::Date("2020-01-02".to_string()),
                FeedElement::Record(record("C")),
            ]
        );
        assert_eq!(
            elements.iter().filter(|e| e.is_record()).count(),
            expected_records
        );
    }

    #[test]
    fn test_flatten_records_only() {
        let feed = FeedResponse::new(vec![
            FeedDay {
                date: "2020-01-01".to_string(),
                records: vec![record("A")],
            },
            FeedDay {
                date: "2020-01-02".to_string(),
                records: vec![],
            },
        ]);

        let elements = flatten_feed(feed, FlattenMode::RecordsOnly);
        assert_eq!(elements, vec![FeedElement::Record(record("A"))]);
    }

    #[test]
    fn test_flatten_empty_feed() {
        assert!(flatten_feed(FeedResponse::default(), FlattenMode::Interleaved).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_extracts_near_earth_objects() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/neo/rest/v1/feed")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("start_date".into(), "2020-01-01".into()),
                mockito::Matcher::UrlEncoded("end_date".into(), "2020-01-02".into()),
                mockito::Matcher::UrlEncoded("detailed".into(), "true".into()),
                mockito::Matcher::UrlEncoded("api_key".into(), "DEMO_KEY".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "element_count": 1,
                    "near_earth_objects": {"2020-01-01": [{"id": "A"}], "2020-01-02": []}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let base = format!("{}/neo/rest/v1/feed", server.url());
        let url = build_neo_url(&base, "DEMO_KEY", date("2020-01-01"), date("2020-01-02")).unwrap();
        let feed = NeoFeedClient::new(5).unwrap().fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(feed.days().len(), 2);
        assert_eq!(feed.record_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_body_is_missing_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/neo/rest/v1/feed")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": "API_KEY_INVALID"}}"#)
            .create_async()
            .await;

        let base = format!("{}/neo/rest/v1/feed", server.url());
        let url = build_neo_url(&base, "bad", date("2020-01-01"), date("2020-01-01")).unwrap();
        let err = NeoFeedClient::new(5).unwrap().fetch(&url).await.unwrap_err();

        assert!(matches!(err, RelayError::MissingKey { status: 403, .. }));
    }
}
