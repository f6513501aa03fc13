use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MetarError, score, score::RiskLevel};

/// Feet per metre, applied to the density altitude estimate.
const FEET_PER_METRE: f64 = 3.28084;

/// One parsed METAR record. Built once by [`crate::report::parse`] and only read afterwards;
/// every derived quantity is recomputed from these fields on each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub raw_text: String,
    pub station_id: String,
    pub observation_time: Option<DateTime<Utc>>,
    pub flight_category: Option<String>,
    pub dew_point_c: f64,
    pub temp_c: f64,
    pub elevation_m: f64,
    pub wind_dir_degrees: i32,
    pub wind_speed_kt: i32,
    pub visibility_mi: f64,
    pub pressure_mb: i32,
}

impl Observation {
    pub fn temp_f(&self) -> f64 {
        self.temp_c * 1.8 + 32.0
    }

    /// Rough standard-atmosphere reference temperature for the field elevation.
    pub fn isa_temp(&self) -> f64 {
        2.0 * self.elevation_m - 15.0
    }

    pub fn density_altitude(&self) -> i64 {
        let deviation = self.temp_c - self.isa_temp();
        let da = FEET_PER_METRE * (f64::from(self.pressure_mb) + 120.0 * deviation);
        da.round_ties_even() as i64
    }

    /// `100 * dew point / temperature`, rounded half to even. Not a calibrated humidity
    /// formula; fails with [`MetarError::UndefinedHumidity`] at exactly 0 °C.
    pub fn relative_humidity(&self) -> Result<i64, MetarError> {
        if self.temp_c == 0.0 {
            return Err(MetarError::UndefinedHumidity);
        }
        Ok((100.0 * (self.dew_point_c / self.temp_c)).round_ties_even() as i64)
    }

    pub fn score_temp_vs_rh(&self) -> Result<i64, MetarError> {
        Ok(score::temp_vs_rh(self.temp_f(), self.relative_humidity()?))
    }

    pub fn score_wind_speed(&self) -> i64 {
        score::wind_speed(self.wind_speed_kt)
    }

    pub fn score_visibility(&self) -> i64 {
        score::visibility(self.visibility_mi)
    }

    pub fn score_pressure(&self) -> i64 {
        score::pressure(self.pressure_mb)
    }

    /// Sum of the four component scores.
    pub fn score(&self) -> Result<i64, MetarError> {
        Ok(self.breakdown()?.total())
    }

    pub fn breakdown(&self) -> Result<ScoreBreakdown, MetarError> {
        Ok(ScoreBreakdown {
            temp_vs_rh: self.score_temp_vs_rh()?,
            wind_speed: self.score_wind_speed(),
            visibility: self.score_visibility(),
            pressure: self.score_pressure(),
        })
    }

    pub fn risk_level(&self) -> Result<RiskLevel, MetarError> {
        Ok(RiskLevel::from_score(self.score()?))
    }

    pub fn emoji(&self) -> Result<&'static str, MetarError> {
        Ok(self.risk_level()?.emoji())
    }

    /// Snapshot of every derived quantity, for display or serialisation.
    pub fn assess(&self) -> Result<Assessment, MetarError> {
        let components = self.breakdown()?;
        let score = components.total();
        let level = RiskLevel::from_score(score);

        Ok(Assessment {
            station_id: self.station_id.clone(),
            observation_time: self.observation_time,
            score,
            level,
            emoji: level.emoji().to_string(),
            components,
            temp_f: self.temp_f(),
            relative_humidity: self.relative_humidity()?,
            density_altitude_ft: self.density_altitude(),
        })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1}°C/{:.1}°C, wind {:03}° at {} kt, visibility {} mi, {} mb",
            self.station_id,
            self.temp_c,
            self.dew_point_c,
            self.wind_dir_degrees,
            self.wind_speed_kt,
            self.visibility_mi,
            self.pressure_mb,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub temp_vs_rh: i64,
    pub wind_speed: i64,
    pub visibility: i64,
    pub pressure: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.temp_vs_rh + self.wind_speed + self.visibility + self.pressure
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub station_id: String,
    pub observation_time: Option<DateTime<Utc>>,
    pub score: i64,
    pub level: RiskLevel,
    pub emoji: String,
    pub components: ScoreBreakdown,
    pub temp_f: f64,
    pub relative_humidity: i64,
    pub density_altitude_ft: i64,
}
