//! Decoding of the aviation weather data server's XML response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::{MetarError, Observation};

/// Millibars per inch of mercury.
const MB_PER_IN_HG: f64 = 33.8639;

/// What to do when a station string matches more than one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Use the first record in response order and discard the rest.
    #[default]
    First,
    /// Fail with [`MetarError::AmbiguousStation`] unless exactly one record came back.
    RequireUnique,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::First => "first",
            SelectionPolicy::RequireUnique => "require_unique",
        }
    }

    pub const fn all() -> &'static [SelectionPolicy] {
        &[SelectionPolicy::First, SelectionPolicy::RequireUnique]
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "first" => Ok(SelectionPolicy::First),
            "require_unique" => Ok(SelectionPolicy::RequireUnique),
            _ => Err(anyhow::anyhow!(
                "Unknown selection policy '{value}'. Supported policies: first, require_unique."
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct XmlResponse {
    #[serde(default)]
    errors: XmlErrors,
    data: Option<XmlData>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlErrors {
    #[serde(rename = "error", default)]
    error: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlData {
    #[serde(rename = "METAR", default)]
    metars: Vec<XmlMetar>,
}

/// Every element is optional here so that a missing one can be reported by name.
#[derive(Debug, Deserialize)]
struct XmlMetar {
    raw_text: Option<String>,
    station_id: Option<String>,
    observation_time: Option<String>,
    temp_c: Option<String>,
    dewpoint_c: Option<String>,
    wind_dir_degrees: Option<String>,
    wind_speed_kt: Option<String>,
    visibility_statute_mi: Option<String>,
    altim_in_hg: Option<String>,
    sea_level_pressure_mb: Option<String>,
    flight_category: Option<String>,
    elevation_m: Option<String>,
}

/// Parse the first observation from a response body.
pub fn parse(raw_markup: &str) -> Result<Observation, MetarError> {
    parse_with(raw_markup, SelectionPolicy::First)
}

pub fn parse_with(raw_markup: &str, policy: SelectionPolicy) -> Result<Observation, MetarError> {
    let observations = parse_all(raw_markup)?;

    if observations.len() > 1 {
        let stations: Vec<String> = observations.iter().map(|o| o.station_id.clone()).collect();
        match policy {
            SelectionPolicy::First => {
                warn!(count = stations.len(), ?stations, "Multiple stations matched, using the first");
            }
            SelectionPolicy::RequireUnique => {
                return Err(MetarError::AmbiguousStation { count: stations.len(), stations });
            }
        }
    }

    observations
        .into_iter()
        .next()
        .ok_or(MetarError::NoObservations { station: String::new(), reason: None })
}

/// Parse every observation in a response body, in response order. Never returns an empty list.
pub fn parse_all(raw_markup: &str) -> Result<Vec<Observation>, MetarError> {
    let response: XmlResponse =
        quick_xml::de::from_str(raw_markup).map_err(|e| MetarError::Xml(e.to_string()))?;

    let records = response.data.map(|d| d.metars).unwrap_or_default();
    if records.is_empty() {
        let reason = response
            .errors
            .error
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        return Err(MetarError::NoObservations {
            station: String::new(),
            reason: (!reason.is_empty()).then_some(reason),
        });
    }

    records.into_iter().map(Observation::try_from).collect()
}

impl TryFrom<XmlMetar> for Observation {
    type Error = MetarError;

    fn try_from(m: XmlMetar) -> Result<Self, Self::Error> {
        let pressure_mb = match (&m.sea_level_pressure_mb, &m.altim_in_hg) {
            (Some(_), _) | (None, None) => {
                let mb = finite("sea_level_pressure_mb", &m.sea_level_pressure_mb)?;
                mb.round_ties_even() as i32
            }
            (None, Some(_)) => {
                let in_hg = finite("altim_in_hg", &m.altim_in_hg)?;
                (in_hg * MB_PER_IN_HG).round_ties_even() as i32
            }
        };

        let visibility_mi = {
            let raw = required("visibility_statute_mi", &m.visibility_statute_mi)?;
            finite_str("visibility_statute_mi", raw.trim_end_matches('+'))
                .map_err(|_| MetarError::InvalidField {
                    field: "visibility_statute_mi",
                    value: raw.to_string(),
                })?
        };

        let observation_time = match m.observation_time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    warn!(value = raw, error = %e, "Ignoring unparseable observation_time");
                    None
                }
            },
        };

        Ok(Observation {
            raw_text: required("raw_text", &m.raw_text)?.to_string(),
            station_id: m.station_id.as_deref().map(str::trim).unwrap_or_default().to_string(),
            observation_time,
            flight_category: m
                .flight_category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            dew_point_c: finite("dewpoint_c", &m.dewpoint_c)?,
            temp_c: finite("temp_c", &m.temp_c)?,
            elevation_m: finite("elevation_m", &m.elevation_m)?,
            wind_dir_degrees: number("wind_dir_degrees", &m.wind_dir_degrees)?,
            wind_speed_kt: number("wind_speed_kt", &m.wind_speed_kt)?,
            visibility_mi,
            pressure_mb,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, MetarError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(MetarError::MissingField { field })
}

/// Like [`number`] for `f64`, but `NaN` and infinities are rejected.
fn finite(field: &'static str, value: &Option<String>) -> Result<f64, MetarError> {
    finite_str(field, required(field, value)?)
}

fn finite_str(field: &'static str, raw: &str) -> Result<f64, MetarError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetarError::InvalidField { field, value: raw.to_string() })
}

fn number<T: FromStr>(field: &'static str, value: &Option<String>) -> Result<T, MetarError> {
    let raw = required(field, value)?;
    raw.parse()
        .map_err(|_| MetarError::InvalidField { field, value: raw.to_string() })
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const EMPTY_STATION: &str = r#"<response xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XML-Schema-instance" version="1.2" xsi:noNamespaceSchemaLocation="http://aviationweather.gov/adds/schema/metar1_2.xsd">
<request_index>17957396</request_index>
<data_source name="metars"/>
<request type="retrieve"/>
<errors>
<error>
Invalid station string: station string cannot be empty
</error>
</errors>
<warnings/>
<time_taken_ms>0</time_taken_ms>
</response>"#;

    pub const TWO_STATIONS: &str = r#"<response xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XML-Schema-instance" version="1.2" xsi:noNamespaceSchemaLocation="http://aviationweather.gov/adds/schema/metar1_2.xsd">
<request_index>30017987</request_index>
<data_source name="metars"/>
<request type="retrieve"/>
<errors/>
<warnings/>
<time_taken_ms>20</time_taken_ms>
<data num_results="2">
<METAR>
<raw_text>
AGGH 031500Z 18003KT 9999 FEW015 SCT025 24/24 Q1010
</raw_text>
<station_id>AGGH</station_id>
<observation_time>2019-08-03T15:00:00Z</observation_time>
<latitude>-9.42</latitude>
<longitude>160.05</longitude>
<temp_c>24.0</temp_c>
<dewpoint_c>24.0</dewpoint_c>
<wind_dir_degrees>180</wind_dir_degrees>
<wind_speed_kt>3</wind_speed_kt>
<visibility_statute_mi>6.21</visibility_statute_mi>
<altim_in_hg>29.822834</altim_in_hg>
<sky_condition sky_cover="FEW" cloud_base_ft_agl="1500"/>
<sky_condition sky_cover="SCT" cloud_base_ft_agl="2500"/>
<flight_category>VFR</flight_category>
<metar_type>METAR</metar_type>
<elevation_m>9.0</elevation_m>
</METAR>
<METAR>
<raw_text>AYPY 031500Z 15005KT 9999 FEW050 24/22 Q1011</raw_text>
<station_id>AYPY</station_id>
<observation_time>2019-08-03T15:00:00Z</observation_time>
<latitude>-9.42</latitude>
<longitude>147.22</longitude>
<temp_c>24.0</temp_c>
<dewpoint_c>22.0</dewpoint_c>
<wind_dir_degrees>150</wind_dir_degrees>
<wind_speed_kt>5</wind_speed_kt>
<visibility_statute_mi>6.21</visibility_statute_mi>
<altim_in_hg>29.852362</altim_in_hg>
<sky_condition sky_cover="FEW" cloud_base_ft_agl="5000"/>
<flight_category>VFR</flight_category>
<metar_type>METAR</metar_type>
<elevation_m>47.0</elevation_m>
</METAR>
</data>
</response>"#;

    /// Wraps one `<METAR>` body in a minimal response envelope.
    pub fn single(metar_body: &str) -> String {
        format!(
            "<response><errors/><data num_results=\"1\"><METAR>{metar_body}</METAR></data></response>"
        )
    }

    pub const KIND_BODY: &str = "<raw_text>KIND 141554Z 27012KT 10SM BKN045 11/03 A3012</raw_text>\
        <station_id>KIND</station_id>\
        <observation_time>2026-10-14T15:54:00Z</observation_time>\
        <temp_c>11.1</temp_c>\
        <dewpoint_c>3.3</dewpoint_c>\
        <wind_dir_degrees>270</wind_dir_degrees>\
        <wind_speed_kt>12</wind_speed_kt>\
        <visibility_statute_mi>10+</visibility_statute_mi>\
        <altim_in_hg>30.12</altim_in_hg>\
        <sea_level_pressure_mb>1019.8</sea_level_pressure_mb>\
        <flight_category>VFR</flight_category>\
        <elevation_m>241.0</elevation_m>";
}
