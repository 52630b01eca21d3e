//! Rate source trait and implementations.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{RateError, RateResult};
use crate::model::Rate;

/// Where authoritative rates come from.
///
/// `fetch(None)` asks for the newest available record ("latest");
/// `fetch(Some(day))` asks for a specific calendar day.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the rate for `day`, or the latest rate when `day` is `None`.
    async fn fetch(&self, day: Option<NaiveDate>) -> RateResult<Rate>;
}

/// Configuration for the HTTP rate source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base endpoint of the remote service.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub retry_backoff: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.ratesapi.io/api".to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Rate source backed by a remote HTTP service.
///
/// A fetch is a GET against the base endpoint suffixed with the ISO day,
/// or the literal `latest` when no day is given. Success is an HTTP 200
/// whose body decodes into [`Rate`]; anything else is a source error.
pub struct HttpRateSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpRateSource {
    /// Create a source from the given configuration.
    pub fn new(config: HttpSourceConfig) -> RateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RateError::Source(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url_for(&self, day: Option<NaiveDate>) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match day {
            Some(day) => format!("{}/{}", base, day.format("%Y-%m-%d")),
            None => format!("{}/latest", base),
        }
    }

    async fn fetch_once(&self, url: &str) -> RateResult<Rate> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RateError::Source(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Source(format!("unexpected status {status}")));
        }

        response
            .json::<Rate>()
            .await
            .map_err(|e| RateError::Source(format!("malformed body: {e}")))
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self, day: Option<NaiveDate>) -> RateResult<Rate> {
        let url = self.url_for(day);
        let mut backoff = self.config.retry_backoff;
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url).await {
                Ok(rate) => {
                    debug!(%url, day = %rate.date, "fetched rate");
                    return Ok(rate);
                }
                Err(e) => {
                    if attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    warn!(%url, attempt, error = %e, "fetch failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

/// Mock rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    rates: dashmap::DashMap<NaiveDate, Rate>,
    latest: std::sync::Mutex<Option<Rate>>,
    calls: std::sync::atomic::AtomicUsize,
    delay: Option<Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create an empty mock; fetching any day fails with a source error.
    pub fn new() -> Self {
        Self {
            rates: dashmap::DashMap::new(),
            latest: std::sync::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Delay every fetch, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Preset the rate served for `rate.date`.
    pub fn set_rate(&self, rate: Rate) {
        self.rates.insert(rate.date, rate);
    }

    /// Preset the rate served for "latest" fetches.
    pub fn set_latest(&self, rate: Rate) {
        *self.latest.lock().unwrap() = Some(rate);
    }

    /// How many fetches have been attempted.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockRateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch(&self, day: Option<NaiveDate>) -> RateResult<Rate> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match day {
            Some(day) => self
                .rates
                .get(&day)
                .map(|entry| entry.clone())
                .ok_or_else(|| RateError::Source(format!("no rate available for {day}"))),
            None => self
                .latest
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| RateError::Source("no latest rate available".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RateTable;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_url_for_day_and_latest() {
        let source = HttpRateSource::new(HttpSourceConfig {
            base_url: "https://rates.example/api/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            source.url_for(Some(day("2024-01-02"))),
            "https://rates.example/api/2024-01-02"
        );
        assert_eq!(source.url_for(None), "https://rates.example/api/latest");
    }

    #[tokio::test]
    async fn test_mock_serves_preset_rate() {
        let source = MockRateSource::new();
        let rate = Rate::new("EUR", day("2024-01-02"), RateTable::default());
        source.set_rate(rate.clone());

        let got = source.fetch(Some(day("2024-01-02"))).await.unwrap();
        assert_eq!(got, rate);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_day_is_source_error() {
        let source = MockRateSource::new();
        let result = source.fetch(Some(day("2024-01-02"))).await;
        assert!(matches!(result, Err(RateError::Source(_))));
    }
}
