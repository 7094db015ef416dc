use chrono::{Duration, NaiveDate};
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::feed::{flatten_feed, window_url, NeoFeedClient};
use crate::hec::{build_hec_uri, HecClient, HecUriOptions};
use crate::models::{DateWindow, PostOutcome, RelaySummary, WindowReport, MAX_WINDOW_DAYS};

/// Split `start..=end` into consecutive windows of at most `step_days` days.
///
/// Each window ends at `start + step_days` clamped to `end`; the next starts the day after.
pub fn plan_windows(
    start: NaiveDate,
    end: NaiveDate,
    step_days: i64,
) -> Result<Vec<DateWindow>> {
    if !(0..=MAX_WINDOW_DAYS).contains(&step_days) {
        return Err(RelayError::InvalidConfig {
            name: "window_days",
            value: step_days.to_string(),
        });
    }

    let step = Duration::days(step_days);
    let mut windows = Vec::new();
    let mut current = start;

    while current <= end {
        // `None` only past NaiveDate::MAX, which is beyond `end` too
        let window_end = current.checked_add_signed(step).map_or(end, |d| d.min(end));
        let window = DateWindow::new(current, window_end)?;
        windows.push(window);

        match window.next_start() {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(windows)
}

/// Walks the configured date range, relaying every feed element to the collector
pub struct NeoHecRelay {
    config: RelayConfig,
    feed: NeoFeedClient,
}

impl NeoHecRelay {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let feed = NeoFeedClient::new(config.neo.timeout_secs)?;
        Ok(Self { config, feed })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Windows this run will fetch
    pub fn windows(&self) -> Result<Vec<DateWindow>> {
        let run = &self.config.run;
        plan_windows(run.start_date, run.end_date, run.window_days)
    }

    /// Collector URI, from the override or built from the host name
    pub fn hec_uri(&self) -> Result<String> {
        match &self.config.hec.uri_override {
            Some(uri) => Ok(uri.clone()),
            None => build_hec_uri(
                self.config.host_name()?,
                &HecUriOptions::from(&self.config.hec),
            ),
        }
    }

    /// Run every window to completion.
    ///
    /// Fetch failures abort the run; post failures are reported and skipped.
    pub async fn run(&self) -> Result<RelaySummary> {
        let hec = HecClient::new(self.hec_uri()?, self.config.hec_token()?, &self.config.hec)?;
        let windows = self.windows()?;

        info!("Relaying {} windows to {}", windows.len(), hec.uri());

        let mut summary = RelaySummary::default();
        for window in windows {
            let report = self.run_window(&hec, window).await?;
            info!(
                "Window {} done: {} delivered, {} failed",
                report.window,
                report.delivered(),
                report.failed()
            );
            summary.windows.push(report);
        }

        info!(
            "Relay complete: {} events posted, {} delivered, {} failed",
            summary.posted(),
            summary.delivered(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Fetch, flatten and post a single window
    pub async fn run_window(&self, hec: &HecClient, window: DateWindow) -> Result<WindowReport> {
        let url = window_url(&self.config.neo.base_url, self.config.api_key()?, &window);
        info!("Fetching NEOs for {}", window);

        let feed = self.feed.fetch(&url).await?;
        let elements = flatten_feed(feed, self.config.run.flatten_mode);

        let mut outcomes = Vec::with_capacity(elements.len());
        for element in &elements {
            let outcome = match hec.post_event(&self.config.run.index, element).await {
                Ok(status) => PostOutcome::from_status(status.as_u16()),
                Err(e) => {
                    error!("HEC post failed: {}", e);
                    PostOutcome::Failed(e.to_string())
                }
            };

            println!("{}", outcome);
            outcomes.push(outcome);
        }

        Ok(WindowReport { window, outcomes })
    }
}
