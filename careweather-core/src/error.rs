use reqwest::StatusCode;

/// Errors that can occur while producing a weather overview.
///
/// Local precondition failures (`MissingCredential`, `IncompleteAddress`) are
/// raised before any network activity; upstream failures carry enough detail
/// to diagnose the offending call without re-issuing it.
#[derive(Debug, thiserror::Error)]
pub enum OverviewError {
    /// OpenWeather API key absent or blank.
    #[error("OpenWeather API key is missing")]
    MissingCredential,

    /// The patient's first listed address lacks a postal code or country.
    #[error("Patient address is missing postal code or country")]
    IncompleteAddress,

    /// No patient with the requested identifier.
    #[error("No patient found with id '{0}'")]
    UnknownPatient(String),

    /// An external call returned a non-success HTTP status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Upstream {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// A successful response could not be decoded into the expected shape.
    #[error("{endpoint} returned an unexpected response body: {detail}")]
    Malformed {
        endpoint: &'static str,
        detail: String,
    },

    /// The patient directory backend failed.
    #[error("Patient directory error: {0}")]
    Directory(String),

    /// Transport-level failure before a status code was available.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
