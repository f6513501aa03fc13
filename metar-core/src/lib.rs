//! Core library for the `metar` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Parsing of METAR data server responses into [`Observation`]s
//! - Flight risk scoring derived from an observation
//! - The report source abstraction and its HTTP implementation
//! - An inbound text message adapter
//!
//! Scores are illustrative only. Do not use them for real flight decisions.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod score;
pub mod webhook;

pub use config::Config;
pub use error::MetarError;
pub use model::{Assessment, Observation, ScoreBreakdown};
pub use provider::{AviationWeatherSource, ReportSource, observe};
pub use report::{SelectionPolicy, parse, parse_with};
pub use score::RiskLevel;
