//! Patient records and the directory they are looked up from.
//!
//! The record types mirror the subset of the FHIR `Patient` resource that a
//! weather lookup needs. The directory is an external collaborator in a real
//! deployment; only an in-memory implementation ships here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OverviewError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub name: Vec<HumanName>,
    #[serde(default)]
    pub address: Vec<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HumanName {
    pub family: Option<String>,
    #[serde(default)]
    pub given: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Patient {
    /// Postal code and country of the first listed address.
    ///
    /// Returns `None` when the patient has no address, or when the first
    /// address lacks either field. Later addresses are never consulted.
    pub fn mailing_location(&self) -> Option<(&str, &str)> {
        let address = self.address.first()?;
        let postal_code = address.postal_code.as_deref().filter(|s| !s.is_empty())?;
        let country = address.country.as_deref().filter(|s| !s.is_empty())?;
        Some((postal_code, country))
    }

    /// Human-readable name from the first name entry, e.g. "John Smith".
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.first()?;
        let mut parts: Vec<&str> = name.given.iter().map(String::as_str).collect();
        if let Some(family) = name.family.as_deref() {
            parts.push(family);
        }
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }
}

/// Lookup-by-identifier interface to whatever system holds patient records.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Find a patient by id. `Ok(None)` means the id is unknown; `Err` means
    /// the backend itself failed.
    async fn find(&self, id: &str) -> Result<Option<Patient>, OverviewError>;
}

/// Directory backed by a plain list of records, e.g. loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    patients: Vec<Patient>,
}

impl InMemoryDirectory {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self { patients }
    }

    /// Build a directory from a JSON array of patient records.
    pub fn from_json_str(json: &str) -> Result<Self, OverviewError> {
        let patients: Vec<Patient> =
            serde_json::from_str(json).map_err(|err| OverviewError::Directory(err.to_string()))?;

        Ok(Self::new(patients))
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

#[async_trait]
impl PatientDirectory for InMemoryDirectory {
    async fn find(&self, id: &str) -> Result<Option<Patient>, OverviewError> {
        Ok(self.patients.iter().find(|p| p.id == id).cloned())
    }
}
