use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use metar_core::{
    AviationWeatherSource, Config, Observation, SelectionPolicy, observe,
    webhook::{handle_message, twiml_reply},
};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "metar",
    version,
    about = "METAR flight risk score (educational use only, not for flight planning)"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `show` for the configured (or demo) station.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the configuration file.
    Configure,

    /// Fetch and score the latest report for a station.
    Show {
        /// ICAO station code; falls back to the configured default.
        station: Option<String>,

        /// Override the configured multi-match policy (first, require_unique).
        #[arg(long)]
        policy: Option<SelectionPolicy>,

        /// Print observation and assessment as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Produce the reply an inbound text message with this body would get.
    Reply {
        /// Message body, normally a station code.
        body: String,

        /// Wrap the reply in a messaging-response document.
        #[arg(long)]
        twiml: bool,
    },
}

impl Cli {
    /// A bare `metar` shows the configured (or demo) station.
    pub fn command_or_default(self) -> Command {
        self.command.unwrap_or(Command::Show { station: None, policy: None, json: false })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        debug!(?config, "Loaded configuration");

        match self.command_or_default() {
            Command::Configure => configure(config)?,
            Command::Show { station, policy, json } => {
                let station = config.station_or_default(station.as_deref());
                let policy = policy.unwrap_or(config.selection);
                let source = AviationWeatherSource::new(&config)?;

                let obs = observe(&source, station, policy)
                    .await
                    .with_context(|| format!("Failed to get METAR for station '{station}'"))?;

                if json {
                    print_json(&obs)?;
                } else {
                    print_human(&obs)?;
                }
            }
            Command::Reply { body, twiml } => {
                let source = AviationWeatherSource::new(&config)?;
                let reply = handle_message(&source, config.selection, &body).await;

                if twiml {
                    println!("{}", twiml_reply(&reply));
                } else {
                    println!("{reply}");
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current_station = config.station_or_default(None).to_string();
    let station = Text::new("Default station:")
        .with_default(&current_station)
        .with_help_message("ICAO code used when `metar show` is given none")
        .prompt()?;
    let station = station.trim().to_uppercase();
    config.default_station = (!station.is_empty()).then_some(station);

    let policies = SelectionPolicy::all().to_vec();
    let start = policies.iter().position(|p| *p == config.selection).unwrap_or(0);
    config.selection = Select::new("When several stations match:", policies)
        .with_starting_cursor(start)
        .prompt()?;

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .with_validator(|secs: &u64| {
            Ok(if *secs == 0 {
                inquire::validator::Validation::Invalid("Timeout must be at least 1 second".into())
            } else {
                inquire::validator::Validation::Valid
            })
        })
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_human(obs: &Observation) -> anyhow::Result<()> {
    println!("{}", obs.raw_text);
    println!("{obs}");

    if let Some(time) = obs.observation_time {
        let age = Utc::now().signed_duration_since(time).num_minutes();
        let category = obs.flight_category.as_deref().unwrap_or("unknown");
        println!(
            "Observed {} ({age} min ago), flight category {category}",
            time.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let assessment = obs.assess().context("Failed to score observation")?;
    let c = assessment.components;
    println!(
        "Temperature {:.1}°F, humidity ~{}%, density altitude {} ft",
        assessment.temp_f, assessment.relative_humidity, assessment.density_altitude_ft
    );
    println!(
        "Score {} {} ({}): temp/rh {}, wind {}, visibility {}, pressure {}",
        assessment.score,
        assessment.emoji,
        assessment.level,
        c.temp_vs_rh,
        c.wind_speed,
        c.visibility,
        c.pressure
    );

    Ok(())
}

fn print_json(obs: &Observation) -> anyhow::Result<()> {
    let assessment = obs.assess().context("Failed to score observation")?;
    let doc = serde_json::json!({
        "observation": obs,
        "assessment": assessment,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
