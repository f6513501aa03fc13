use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::{Config, MetarError};

use super::ReportSource;

/// The aviation weather ADDS data server (`httpparam` interface).
#[derive(Debug, Clone)]
pub struct AviationWeatherSource {
    base_url: String,
    hours_before_now: u32,
    http: Client,
}

impl AviationWeatherSource {
    pub fn new(config: &Config) -> Result<Self, MetarError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MetarError::Upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            hours_before_now: config.hours_before_now,
            http,
        })
    }

    fn query<'a>(&self, station_code: &'a str, hours: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("dataSource", "metars"),
            ("requestType", "retrieve"),
            ("format", "xml"),
            ("stationString", station_code),
            ("hoursBeforeNow", hours),
        ]
    }
}

#[async_trait]
impl ReportSource for AviationWeatherSource {
    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn fetch(&self, station_code: &str) -> Result<String, MetarError> {
        let hours = self.hours_before_now.to_string();
        let query = self.query(station_code, &hours);

        debug!(?query, "Requesting METAR");

        let res = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| MetarError::Upstream(format!("Failed to send request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| MetarError::Upstream(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(MetarError::Upstream(format!(
                "Data server responded with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        debug!(bytes = body.len(), "Received METAR response");
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
