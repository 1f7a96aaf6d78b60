use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::OverviewError,
    model::{Coordinates, Units, WeatherOverview},
};

use super::OverviewProvider;

const GEO_BASE_URL: &str = "http://api.openweathermap.org";
const ONECALL_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    geo_base_url: String,
    onecall_base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(api_key, GEO_BASE_URL.to_string(), ONECALL_BASE_URL.to_string())
    }

    /// Point both endpoints at another host, e.g. a local mock server.
    pub fn with_base_urls(
        api_key: String,
        geo_base_url: String,
        onecall_base_url: String,
    ) -> Self {
        Self {
            api_key,
            http: Client::new(),
            geo_base_url,
            onecall_base_url,
        }
    }

    fn require_api_key(&self) -> Result<&str, OverviewError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(OverviewError::MissingCredential);
        }
        Ok(key)
    }

    async fn fetch_coordinates(
        &self,
        postal_code: &str,
        country: &str,
    ) -> Result<Coordinates, OverviewError> {
        let api_key = self.require_api_key()?;

        let url = format!("{}/geo/1.0/zip", self.geo_base_url);
        let zip = format!("{postal_code},{country}");

        debug!(postal_code, country, "resolving coordinates");

        let res = self
            .http
            .get(&url)
            .query(&[("zip", zip.as_str()), ("appid", api_key)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(OverviewError::Upstream {
                endpoint: "Geocoding",
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: GeoResponse =
            serde_json::from_str(&body).map_err(|err| OverviewError::Malformed {
                endpoint: "Geocoding",
                detail: err.to_string(),
            })?;

        Ok(Coordinates {
            lat: parsed.lat,
            lon: parsed.lon,
        })
    }

    async fn fetch_overview(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherOverview, OverviewError> {
        let api_key = self.require_api_key()?;

        let url = format!("{}/data/3.0/onecall/overview", self.onecall_base_url);
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();

        debug!(lat = coordinates.lat, lon = coordinates.lon, %units, "fetching weather overview");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", units.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(OverviewError::Upstream {
                endpoint: "Weather overview",
                status,
                body: truncate_body(&body),
            });
        }

        // A 2xx body without the overview text is rejected here as well,
        // since `weather_overview` is a required field of the target shape.
        let parsed: WeatherOverview =
            serde_json::from_str(&body).map_err(|err| OverviewError::Malformed {
                endpoint: "Weather overview",
                detail: err.to_string(),
            })?;

        Ok(parsed)
    }
}

/// Body of a successful geocoding response.
#[derive(Debug, Deserialize)]
struct GeoResponse {
    lat: f64,
    lon: f64,
}

#[async_trait]
impl OverviewProvider for OpenWeatherProvider {
    async fn coordinates_for(
        &self,
        postal_code: &str,
        country: &str,
    ) -> Result<Coordinates, OverviewError> {
        self.fetch_coordinates(postal_code, country).await
    }

    async fn overview_at(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherOverview, OverviewError> {
        self.fetch_overview(coordinates, units).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
