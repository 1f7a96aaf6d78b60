//! Core library for the `careweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather geocoding + weather overview client
//! - The patient record model and directory abstraction
//! - The overview service tying them together
//!
//! It is used by `careweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod patient;
pub mod provider;
pub mod service;

pub use config::{API_KEY_ENV, Config};
pub use error::OverviewError;
pub use model::{Coordinates, Units, WeatherOverview};
pub use patient::{Address, HumanName, InMemoryDirectory, Patient, PatientDirectory};
pub use provider::{OverviewProvider, provider_from_config};
pub use service::OverviewService;
