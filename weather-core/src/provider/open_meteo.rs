use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    error::{LOCATION_SERVICE_UNAVAILABLE, WeatherError},
    forecast::{self, ForecastRequest},
    model::{Coordinates, ForecastResult, Suggestion},
};

use super::{ForecastProvider, Geocoder};

const USER_AGENT: &str = concat!("weather-cli/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of candidates asked from the geocoding service.
pub const SUGGESTION_COUNT: usize = 5;
pub const SUGGESTION_LANGUAGE: &str = "en";

/// Open-Meteo geocoding and forecast endpoints. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoding_url: Url,
    forecast_url: Url,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(geocoding_url: Url, forecast_url: Url) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            geocoding_url,
            forecast_url,
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Absent or null when nothing matched.
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
}

#[async_trait]
impl Geocoder for OpenMeteoProvider {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError> {
        tracing::debug!(query, "requesting place suggestions");

        let count = SUGGESTION_COUNT.to_string();
        let res = self
            .http
            .get(self.geocoding_url.clone())
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", SUGGESTION_LANGUAGE),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::SuggestionService(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, "geocoding request failed");
            return Err(WeatherError::SuggestionService(
                LOCATION_SERVICE_UNAVAILABLE.to_string(),
            ));
        }

        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::SuggestionService(e.to_string()))?;
        let parsed: OmSearchResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherError::SuggestionService(format!("Failed to parse location results: {e}"))
        })?;

        // Entries that do not decode are skipped rather than failing the whole list.
        let results = parsed.results.unwrap_or_default();
        let total = results.len();
        let suggestions: Vec<Suggestion> = results
            .into_iter()
            .filter_map(|raw| serde_json::from_value(raw).ok())
            .collect();
        if suggestions.len() < total {
            tracing::debug!(dropped = total - suggestions.len(), "skipped malformed geocoding entries");
        }

        Ok(suggestions)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn forecast(&self, coordinates: Coordinates) -> Result<ForecastResult, WeatherError> {
        tracing::debug!(%coordinates, "requesting forecast");

        let res = self
            .http
            .get(self.forecast_url.clone())
            .query(&ForecastRequest::new(coordinates).query_pairs())
            .send()
            .await
            .map_err(|e| WeatherError::ForecastService(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::ForecastService(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "forecast request failed");
        }

        forecast::parse_response(status.is_success(), &body)
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
