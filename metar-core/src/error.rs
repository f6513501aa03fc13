use thiserror::Error;

/// Everything that can go wrong between asking for a station and reading its score.
#[derive(Debug, Error)]
pub enum MetarError {
    /// Transport failure, timeout or non-success status from the data server.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The response carried zero `<METAR>` records.
    #[error("No observations returned for station '{station}'{}", reason_suffix(.reason))]
    NoObservations {
        station: String,
        reason: Option<String>,
    },

    /// An expected element is absent from the record.
    #[error("Missing field '{field}' in METAR record")]
    MissingField { field: &'static str },

    /// An element is present but its text is not a usable number or timestamp.
    #[error("Invalid value '{value}' for field '{field}' in METAR record")]
    InvalidField { field: &'static str, value: String },

    /// The body is not markup of the expected shape.
    #[error("Malformed METAR response: {0}")]
    Xml(String),

    /// More than one record matched and the selection policy requires exactly one.
    #[error("Station string matched {count} stations ({}); expected exactly one", .stations.join(", "))]
    AmbiguousStation { count: usize, stations: Vec<String> },

    /// Relative humidity divides by the temperature in Celsius, which is zero here.
    #[error("Relative humidity is undefined at 0.0 °C")]
    UndefinedHumidity,
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_observations_includes_provider_reason() {
        let err = MetarError::NoObservations {
            station: String::new(),
            reason: Some("Invalid station string: station string cannot be empty".into()),
        };

        let msg = err.to_string();
        assert!(msg.starts_with("No observations returned for station ''"));
        assert!(msg.ends_with("station string cannot be empty"));
    }

    #[test]
    fn ambiguous_station_lists_candidates() {
        let err = MetarError::AmbiguousStation {
            count: 2,
            stations: vec!["AGGH".into(), "AYPY".into()],
        };

        assert!(err.to_string().contains("AGGH, AYPY"));
    }
}
