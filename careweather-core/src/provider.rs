use crate::{
    Config,
    error::OverviewError,
    model::{Coordinates, Units, WeatherOverview},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two upstream operations a weather overview needs: resolving a postal
/// address to coordinates, and fetching the overview text for coordinates.
#[async_trait]
pub trait OverviewProvider: Send + Sync + Debug {
    /// Resolve a postal code and country code to geographic coordinates.
    async fn coordinates_for(
        &self,
        postal_code: &str,
        country: &str,
    ) -> Result<Coordinates, OverviewError>;

    /// Fetch the weather overview for coordinates in the given unit system.
    async fn overview_at(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherOverview, OverviewError>;
}

/// Construct the OpenWeather-backed provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn OverviewProvider>> {
    let api_key = config.resolve_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: set OPENWEATHER_API_KEY or run `careweather configure` and enter your API key."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_works_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
