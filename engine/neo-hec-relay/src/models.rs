use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{RelayError, Result};

/// Largest span, in days, the NEO feed accepts between start and end date
pub const MAX_WINDOW_DAYS: i64 = 7;

/// Key holding the date-keyed NEO mapping in the feed body
pub const NEAR_EARTH_OBJECTS: &str = "near_earth_objects";

/// One near-earth object as returned by the feed, passed through untouched
pub type NeoRecord = serde_json::Map<String, Value>;

/// A validated date range submitted to the feed in one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting spans outside `0..=MAX_WINDOW_DAYS`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let days = (end - start).num_days();
        if !(0..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(RelayError::InvalidDateWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end (0 for a single-day window)
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// First date after this window, `None` past the last representable date
    pub fn next_start(&self) -> Option<NaiveDate> {
        self.end.succ_opt()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// All records the feed listed under one date
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDay {
    pub date: String,
    pub records: Vec<NeoRecord>,
}

/// The date-keyed NEO mapping for one window, in the order the feed listed it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedResponse {
    days: Vec<FeedDay>,
}

impl FeedResponse {
    pub fn new(days: Vec<FeedDay>) -> Self {
        Self { days }
    }

    /// Extract the `near_earth_objects` mapping from a parsed feed body
    pub fn from_body(body: Value, status: u16) -> Result<Self> {
        let objects = match body {
            Value::Object(mut map) => map.remove(NEAR_EARTH_OBJECTS),
            _ => None,
        }
        .ok_or(RelayError::MissingKey {
            key: NEAR_EARTH_OBJECTS,
            status,
        })?;

        let Value::Object(by_date) = objects else {
            return Err(RelayError::UnexpectedShape(format!(
                "'{}' is not an object",
                NEAR_EARTH_OBJECTS
            )));
        };

        let mut days = Vec::with_capacity(by_date.len());
        for (date, records) in by_date {
            let Value::Array(records) = records else {
                return Err(RelayError::UnexpectedShape(format!(
                    "records for {} are not a list",
                    date
                )));
            };

            let records = records
                .into_iter()
                .map(|record| match record {
                    Value::Object(record) => Ok(record),
                    other => Err(RelayError::UnexpectedShape(format!(
                        "record under {} is not an object: {}",
                        date, other
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;

            days.push(FeedDay { date, records });
        }

        Ok(Self { days })
    }

    pub fn days(&self) -> &[FeedDay] {
        &self.days
    }

    pub fn into_days(self) -> Vec<FeedDay> {
        self.days
    }

    /// Total records across all dates
    pub fn record_count(&self) -> usize {
        self.days.iter().map(|day| day.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// How the date-keyed mapping is turned into a flat sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenMode {
    /// Each date key is emitted ahead of its records
    #[default]
    Interleaved,
    /// Only the records are emitted
    RecordsOnly,
}

/// One element of the flattened feed, posted as a single event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedElement {
    Date(String),
    Record(NeoRecord),
}

impl FeedElement {
    pub fn is_record(&self) -> bool {
        matches!(self, FeedElement::Record(_))
    }
}

/// Envelope posted to the HTTP Event Collector
#[derive(Debug, Serialize)]
pub struct HecEvent<'a> {
    pub sourcetype: &'static str,
    pub index: &'a str,
    pub event: &'a FeedElement,
}

impl<'a> HecEvent<'a> {
    pub const SOURCETYPE: &'static str = "_json";

    pub fn new(index: &'a str, event: &'a FeedElement) -> Self {
        Self {
            sourcetype: Self::SOURCETYPE,
            index,
            event,
        }
    }
}

/// Result of posting one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Collector answered exactly 200
    Delivered,
    /// Collector answered with any other status
    Rejected(u16),
    /// Request never got a response
    Failed(String),
}

impl PostOutcome {
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            PostOutcome::Delivered
        } else {
            PostOutcome::Rejected(status)
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, PostOutcome::Delivered)
    }
}

impl fmt::Display for PostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostOutcome::Delivered => write!(f, "Successfully uploaded via HEC"),
            PostOutcome::Rejected(status) => {
                write!(f, "Failed to upload via HEC with status code {}", status)
            }
            PostOutcome::Failed(error) => write!(f, "Failed to upload via HEC: {}", error),
        }
    }
}

/// Per-window results
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: DateWindow,
    pub outcomes: Vec<PostOutcome>,
}

impl WindowReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Results of a full run
#[derive(Debug, Clone, Default)]
pub struct RelaySummary {
    pub windows: Vec<WindowReport>,
}

impl RelaySummary {
    pub fn delivered(&self) -> usize {
        self.windows.iter().map(WindowReport::delivered).sum()
    }

    pub fn failed(&self) -> usize {
        self.windows.iter().map(WindowReport::failed).sum()
    }

    pub fn posted(&self) -> usize {
        self.windows.iter().map(|w| w.outcomes.len()).sum()
    }
}
