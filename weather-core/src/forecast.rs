//! Forecast request shape and response validation.

use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{Coordinates, CurrentConditions, DailyBlock, ForecastResult, HourlyBlock},
};

pub const CURRENT_VARIABLES: &[&str] = &["temperature_2m", "weather_code", "wind_speed_10m"];
pub const HOURLY_VARIABLES: &[&str] = &["temperature_2m", "weather_code"];
pub const DAILY_VARIABLES: &[&str] = &["weather_code", "temperature_2m_max", "temperature_2m_min"];

/// The fixed set of variables and units the application asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
}

impl ForecastRequest {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.coordinates.latitude().to_string()),
            ("longitude", self.coordinates.longitude().to_string()),
            ("current", CURRENT_VARIABLES.join(",")),
            ("hourly", HOURLY_VARIABLES.join(",")),
            ("daily", DAILY_VARIABLES.join(",")),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

/// Forecast response body with every block optional, so that missing data can be told
/// apart from a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub hourly: Option<HourlyBlock>,
    #[serde(default)]
    pub daily: Option<DailyBlock>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ForecastPayload {
    /// Accept the payload only if transport succeeded, no error flag is set and every
    /// block is present.
    pub fn into_result(self, transport_ok: bool) -> Result<ForecastResult, WeatherError> {
        if !transport_ok || self.error {
            return Err(WeatherError::forecast_reason(self.reason));
        }

        let (Some(current), Some(hourly), Some(daily)) = (self.current, self.hourly, self.daily)
        else {
            return Err(WeatherError::IncompleteForecastData);
        };

        Ok(ForecastResult {
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.unwrap_or_else(|| "UTC".to_string()),
            utc_offset_seconds: self.utc_offset_seconds,
            current,
            hourly,
            daily,
        })
    }
}

/// Turn a raw HTTP outcome into a forecast.
///
/// A body that fails to decode on an error status still yields the generic failure message.
pub fn parse_response(transport_ok: bool, body: &str) -> Result<ForecastResult, WeatherError> {
    match serde_json::from_str::<ForecastPayload>(body) {
        Ok(payload) => payload.into_result(transport_ok),
        Err(_) if !transport_ok => Err(WeatherError::forecast_reason(None)),
        Err(err) => Err(WeatherError::ForecastService(format!(
            "Failed to parse forecast response: {err}"
        ))),
    }
}
