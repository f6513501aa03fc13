//! Inbound text message adapter.
//!
//! The message body is a station code; the reply is `"{emoji} {score}"`.
//! Failures never propagate out of here, they become a short reply instead.

use tracing::{info, warn};

use crate::{MetarError, provider::{ReportSource, observe}, report::SelectionPolicy};

/// Answer one inbound message.
pub async fn handle_message(
    source: &dyn ReportSource,
    policy: SelectionPolicy,
    body: &str,
) -> String {
    let station = body.trim();
    if station.is_empty() {
        return "Send a station code, e.g. KIND".to_string();
    }

    let result = observe(source, station, policy).await.and_then(|obs| {
        let score = obs.score()?;
        Ok(format!("{} {}", obs.emoji()?, score))
    });

    match result {
        Ok(reply) => {
            info!(station, %reply, "Replying to message");
            reply
        }
        Err(err) => {
            warn!(station, error = %err, "Could not score station");
            user_message(station, &err)
        }
    }
}

/// Short reply text for a failure. Independent of the error's `Display`.
pub fn user_message(station: &str, err: &MetarError) -> String {
    match err {
        MetarError::NoObservations { .. } => format!("No recent report for {station}"),
        MetarError::AmbiguousStation { stations, .. } => {
            format!("{station} matches several stations: {}", stations.join(", "))
        }
        MetarError::UndefinedHumidity => format!("Cannot score {station} at exactly 0°C"),
        MetarError::MissingField { .. }
        | MetarError::InvalidField { .. }
        | MetarError::Xml(_) => format!("Report for {station} could not be read"),
        MetarError::Upstream(_) => "Weather service unavailable, try again later".to_string(),
    }
}

/// Wrap reply text in a messaging-response document.
pub fn twiml_reply(text: &str) -> String {
    let escaped = quick_xml::escape::escape(text);
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{escaped}</Message></Response>"
    )
}
