use thiserror::Error;

/// Fallback reason when the forecast service fails without explaining why.
pub const DEFAULT_FORECAST_REASON: &str = "Failed to fetch weather data";

/// Reason used when the geocoding service answers with a non-success status.
pub const LOCATION_SERVICE_UNAVAILABLE: &str = "Location service unavailable";

/// Every failure the session can surface.
///
/// The `Display` output is the message shown to the user, so variants carrying a reason
/// print it verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// Geocoding request failed or returned a non-success status.
    #[error("{0}")]
    SuggestionService(String),

    /// A selected suggestion did not carry usable coordinates.
    #[error("Invalid location coordinates")]
    InvalidCoordinates,

    /// Transport failure or explicit error flag from the forecast service.
    #[error("{0}")]
    ForecastService(String),

    /// The forecast service answered, but without a current, hourly or daily block.
    #[error("Incomplete weather data received")]
    IncompleteForecastData,

    /// The daily window could not be computed. Never shown to the user.
    #[error("Failed to compute daily window: {0}")]
    Projection(String),
}

impl WeatherError {
    pub fn forecast_reason(reason: Option<String>) -> Self {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FORECAST_REASON.to_string());
        WeatherError::ForecastService(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_reason_prefers_provided_text() {
        let err = WeatherError::forecast_reason(Some("Parameter X invalid".into()));
        assert_eq!(err.to_string(), "Parameter X invalid");
    }

    #[test]
    fn forecast_reason_falls_back_to_generic_message() {
        assert_eq!(WeatherError::forecast_reason(None).to_string(), DEFAULT_FORECAST_REASON);
        assert_eq!(
            WeatherError::forecast_reason(Some("  ".into())).to_string(),
            DEFAULT_FORECAST_REASON
        );
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(WeatherError::InvalidCoordinates.to_string(), "Invalid location coordinates");
        assert_eq!(
            WeatherError::IncompleteForecastData.to_string(),
            "Incomplete weather data received"
        );
    }
}
