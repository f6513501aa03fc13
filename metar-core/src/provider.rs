use async_trait::async_trait;
use std::fmt::Debug;

use crate::{MetarError, Observation, report, report::SelectionPolicy};

pub mod aviationweather;

pub use aviationweather::AviationWeatherSource;

/// Something that can return the raw METAR markup for a station string.
#[async_trait]
pub trait ReportSource: Send + Sync + Debug {
    /// Returns the response body verbatim. Content is not inspected here.
    async fn fetch(&self, station_code: &str) -> Result<String, MetarError>;
}

/// Fetch then parse: the whole pipeline from station string to [`Observation`].
pub async fn observe(
    source: &dyn ReportSource,
    station_code: &str,
    policy: SelectionPolicy,
) -> Result<Observation, MetarError> {
    let body = source.fetch(station_code).await?;

    report::parse_with(&body, policy).map_err(|err| match err {
        MetarError::NoObservations { reason, .. } => {
            MetarError::NoObservations { station: station_code.to_string(), reason }
        }
        other => other,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::report::fixtures::{EMPTY_STATION, TWO_STATIONS};

    #[tokio::test]
    async fn observe_parses_fetched_body() {
        let source = StaticSource(TWO_STATIONS.to_string());
        let obs = observe(&source, "AGGH", SelectionPolicy::First).await.unwrap();
        assert_eq!(obs.station_id, "AGGH");
    }

    #[tokio::test]
    async fn observe_names_station_when_nothing_matched() {
        let source = StaticSource(EMPTY_STATION.to_string());
        let err = observe(&source, "", SelectionPolicy::First).await.unwrap_err();

        match err {
            MetarError::NoObservations { station, reason } => {
                assert_eq!(station, "");
                assert!(reason.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn observe_propagates_upstream_failures() {
        let err = observe(&FailingSource, "KIND", SelectionPolicy::First).await.unwrap_err();
        assert!(matches!(err, MetarError::Upstream(_)));
    }
}
