use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Geographic point produced by the geocoding endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Unit system understood by the weather endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Standard, Units::Metric, Units::Imperial]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "standard" => Ok(Units::Standard),
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported unit systems: standard, metric, imperial."
            )),
        }
    }
}

/// Body of a successful one-call overview response.
///
/// Field names match the OpenWeather wire format. Only `weather_overview`
/// reaches the service caller; the rest is kept for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherOverview {
    pub lat: f64,
    pub lon: f64,
    pub tz: String,
    pub date: NaiveDate,
    pub units: Units,
    pub weather_overview: String,
}
