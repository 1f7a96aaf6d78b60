//! High-level facade composing the patient directory and the weather provider.

use tracing::debug;

use crate::{
    error::OverviewError,
    model::Units,
    patient::{Patient, PatientDirectory},
    provider::OverviewProvider,
};

/// Public entry point for producing weather overviews for patients.
pub struct OverviewService {
    provider: Box<dyn OverviewProvider>,
}

impl OverviewService {
    pub fn new(provider: Box<dyn OverviewProvider>) -> Self {
        Self { provider }
    }

    /// Weather overview text for the patient's first listed address.
    ///
    /// The address is validated before any network activity. The two upstream
    /// calls are strictly sequential; a geocoding failure propagates unchanged
    /// and the weather endpoint is never contacted.
    pub async fn overview_for(
        &self,
        patient: &Patient,
        units: Units,
    ) -> Result<String, OverviewError> {
        let (postal_code, country) = patient
            .mailing_location()
            .ok_or(OverviewError::IncompleteAddress)?;

        let coordinates = self.provider.coordinates_for(postal_code, country).await?;
        debug!(lat = coordinates.lat, lon = coordinates.lon, "address resolved");

        let overview = self.provider.overview_at(coordinates, units).await?;

        Ok(overview.weather_overview)
    }

    /// Look up a patient in the directory and produce their overview.
    pub async fn overview_for_patient_id(
        &self,
        directory: &dyn PatientDirectory,
        patient_id: &str,
        units: Units,
    ) -> Result<String, OverviewError> {
        let patient = directory
            .find(patient_id)
            .await?
            .ok_or_else(|| OverviewError::UnknownPatient(patient_id.to_string()))?;

        self.overview_for(&patient, units).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Coordinates, WeatherOverview},
        patient::{Address, InMemoryDirectory},
        provider::openweather::OpenWeatherProvider,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn patient_with(postal_code: Option<&str>, country: Option<&str>) -> Patient {
        Patient {
            id: "123".to_string(),
            name: Vec::new(),
            address: vec![Address {
                postal_code: postal_code.map(str::to_string),
                country: country.map(str::to_string),
                ..Address::default()
            }],
        }
    }

    /// Provider that must never be reached; used to prove preconditions are
    /// checked before any upstream call.
    #[derive(Debug)]
    struct UnreachableProvider;

    #[async_trait]
    impl OverviewProvider for UnreachableProvider {
        async fn coordinates_for(
            &self,
            _postal_code: &str,
            _country: &str,
        ) -> Result<Coordinates, OverviewError> {
            panic!("no upstream call expected");
        }

        async fn overview_at(
            &self,
            _coordinates: Coordinates,
            _units: Units,
        ) -> Result<WeatherOverview, OverviewError> {
            panic!("no upstream call expected");
        }
    }

    /// Provider with a canned happy path.
    #[derive(Debug)]
    struct FixedProvider;

    #[async_trait]
    impl OverviewProvider for FixedProvider {
        async fn coordinates_for(
            &self,
            _postal_code: &str,
            _country: &str,
        ) -> Result<Coordinates, OverviewError> {
            Ok(Coordinates { lat: 37.84, lon: -122.11 })
        }

        async fn overview_at(
            &self,
            coordinates: Coordinates,
            units: Units,
        ) -> Result<WeatherOverview, OverviewError> {
            Ok(WeatherOverview {
                lat: coordinates.lat,
                lon: coordinates.lon,
                tz: "-07:00".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
                units,
                weather_overview: "Clear skies with a light breeze.".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn incomplete_address_fails_without_upstream_calls() {
        let service = OverviewService::new(Box::new(UnreachableProvider));

        for patient in [
            Patient { id: "p".to_string(), name: Vec::new(), address: Vec::new() },
            patient_with(None, Some("US")),
            patient_with(Some("94556"), None),
        ] {
            let err = service.overview_for(&patient, Units::Imperial).await.unwrap_err();
            assert!(matches!(err, OverviewError::IncompleteAddress));
        }
    }

    #[tokio::test]
    async fn returns_overview_text_only() {
        let service = OverviewService::new(Box::new(FixedProvider));
        let patient = patient_with(Some("94556"), Some("US"));

        let overview = service.overview_for(&patient, Units::Imperial).await.unwrap();
        assert_eq!(overview, "Clear skies with a light breeze.");
    }

    #[tokio::test]
    async fn unknown_patient_id_is_reported() {
        let service = OverviewService::new(Box::new(UnreachableProvider));
        let directory = InMemoryDirectory::new(vec![patient_with(Some("94556"), Some("US"))]);

        let err = service
            .overview_for_patient_id(&directory, "999", Units::Imperial)
            .await
            .unwrap_err();

        assert!(matches!(err, OverviewError::UnknownPatient(id) if id == "999"));
    }

    #[tokio::test]
    async fn directory_lookup_feeds_the_provider() {
        let service = OverviewService::new(Box::new(FixedProvider));
        let directory = InMemoryDirectory::new(vec![patient_with(Some("94556"), Some("US"))]);

        let overview = service
            .overview_for_patient_id(&directory, "123", Units::Imperial)
            .await
            .unwrap();

        assert_eq!(overview, "Clear skies with a light breeze.");
    }

    #[tokio::test]
    async fn geocoding_failure_skips_the_weather_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/zip"))
            .respond_with(ResponseTemplate::new(500).set_body_string("geocoder down"))
            .mount(&server)
            .await;

        // The weather endpoint must receive zero requests.
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall/overview"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_urls(
            "test-key".to_string(),
            server.uri(),
            server.uri(),
        );
        let service = OverviewService::new(Box::new(provider));
        let patient = patient_with(Some("94556"), Some("US"));

        let err = service.overview_for(&patient, Units::Imperial).await.unwrap_err();

        match err {
            OverviewError::Upstream { status, body, .. } => {
                assert_eq!(status.as_u16(), 500);
                assert!(body.contains("geocoder down"));
            }
            other => panic!("expected Upstream error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn end_to_end_overview_through_both_endpoints() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/zip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lat": 37.84,
                "lon": -122.11
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall/overview"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lat": 37.84,
                "lon": -122.11,
                "tz": "-07:00",
                "date": "2024-01-01",
                "units": "imperial",
                "weather_overview": "Clear skies with a light breeze."
            })))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_urls(
            "test-key".to_string(),
            server.uri(),
            server.uri(),
        );
        let service = OverviewService::new(Box::new(provider));
        let directory = InMemoryDirectory::new(vec![patient_with(Some("94556"), Some("US"))]);

        let overview = service
            .overview_for_patient_id(&directory, "123", Units::Imperial)
            .await
            .unwrap();

        assert_eq!(overview, "Clear skies with a light breeze.");
    }
}
