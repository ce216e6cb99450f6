//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration of the geocoding and forecast endpoints
//! - The Open-Meteo provider behind the [`Geocoder`] and [`ForecastProvider`] traits
//! - Debounced place suggestions ([`suggest`])
//! - Forecast request shape and response validation ([`forecast`])
//! - The 7-day window over the daily forecast ([`projector`])
//! - WMO weather code descriptions ([`weather_code`])
//! - The session state machine and its async driver ([`session`])
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod projector;
pub mod provider;
pub mod session;
pub mod suggest;
pub mod weather_code;

pub use config::Config;
pub use error::WeatherError;
pub use model::{
    Coordinates, CurrentConditions, DailyBlock, ForecastResult, HourlyBlock, Suggestion,
};
pub use provider::{ForecastProvider, Geocoder, open_meteo::OpenMeteoProvider, provider_from_config};
pub use session::{Effect, Event, Session, SessionState};
pub use suggest::SuggestionResolver;

