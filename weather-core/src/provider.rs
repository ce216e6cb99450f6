use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, ForecastResult, Suggestion},
    provider::open_meteo::OpenMeteoProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Turns free text into candidate places.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Raw candidates as returned by the service. Range filtering happens in
    /// [`crate::suggest::lookup`].
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError>;
}

/// Fetches current, hourly and daily conditions for a point.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, coordinates: Coordinates) -> Result<ForecastResult, WeatherError>;
}

/// Construct the Open-Meteo provider from the configured endpoints.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenMeteoProvider> {
    let (geocoding_url, forecast_url) = config.endpoints()?;

    OpenMeteoProvider::new(geocoding_url, forecast_url).context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_default_config() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_errors_on_bad_url() {
        let cfg = Config {
            forecast_url: "not a url".into(),
            ..Config::default()
        };
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid forecast URL"));
    }
}
