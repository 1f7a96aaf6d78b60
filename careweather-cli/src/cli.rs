use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};

use careweather_core::{
    Config, InMemoryDirectory, OverviewService, Units, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "careweather", version, about = "Patient weather overview CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit system.
    Configure,

    /// Show the weather overview for a patient's address on file.
    Overview {
        /// Patient identifier.
        patient_id: String,

        /// JSON file holding an array of patient records. A bundled demo
        /// record (id "123") is used when absent.
        #[arg(long)]
        patients: Option<PathBuf>,

        /// Unit system: "standard", "metric" or "imperial".
        #[arg(long)]
        units: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Overview { patient_id, patients, units } => {
                overview(&patient_id, patients.as_deref(), units.as_deref()).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let units = Select::new("Default unit system:", Units::all().to_vec())
        .prompt()
        .context("Failed to read unit system selection")?;
    config.set_default_units(units);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn overview(
    patient_id: &str,
    patients: Option<&Path>,
    units: Option<&str>,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let units = match units {
        Some(value) => Units::try_from(value)?,
        None => config.default_units()?,
    };

    let directory = match patients {
        Some(path) => load_directory(path)?,
        None => demo_directory()?,
    };

    let provider = provider_from_config(&config)?;
    let service = OverviewService::new(provider);

    let overview = service
        .overview_for_patient_id(&directory, patient_id, units)
        .await?;

    println!("{overview}");

    Ok(())
}

fn load_directory(path: &Path) -> anyhow::Result<InMemoryDirectory> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read patient file: {}", path.display()))?;

    InMemoryDirectory::from_json_str(&json)
        .with_context(|| format!("Failed to parse patient file: {}", path.display()))
}

/// Single-record directory matching the sample patient the tool ships with.
fn demo_directory() -> anyhow::Result<InMemoryDirectory> {
    let records = serde_json::json!([
        {
            "id": "123",
            "name": [{ "family": "Smith", "given": ["John"] }],
            "address": [
                {
                    "line": ["2135 Ascot Dr"],
                    "city": "Moraga",
                    "state": "CA",
                    "postalCode": "94556",
                    "country": "US"
                }
            ]
        }
    ]);

    InMemoryDirectory::from_json_str(&records.to_string())
        .context("Failed to build the demo patient directory")
}
