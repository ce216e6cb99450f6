use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::WeatherError, projector};

/// A candidate place returned by the geocoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Suggestion {
    /// Text put back into the search box once the place is chosen,
    /// e.g. "Springfield, Illinois US".
    pub fn label(&self) -> String {
        match self.admin1.as_deref().filter(|a| !a.is_empty()) {
            Some(admin1) => format!("{}, {} {}", self.name, admin1, self.country_code),
            None => format!("{}, {}", self.name, self.country_code),
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        in_range(self.latitude, self.longitude)
    }

    pub fn coordinates(&self) -> Result<Coordinates, WeatherError> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A validated point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !in_range(latitude, longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(
            f,
            "{:.2}°{}, {:.2}°{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

fn in_range(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && latitude.abs() <= 90.0
        && longitude.abs() <= 180.0
}

/// Conditions at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    pub weather_code: i32,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
}

/// Hourly series; index `i` of every vector describes `time[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<f64>,
    pub weather_code: Vec<i32>,
}

/// Daily series; index `i` of every vector describes `time[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<f64>,
}

impl DailyBlock {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True when all four series have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        self.weather_code.len() == n && self.temperature_max.len() == n && self.temperature_min.len() == n
    }
}

/// A complete forecast as accepted from the forecast service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: CurrentConditions,
    pub hourly: HourlyBlock,
    pub daily: DailyBlock,
}

impl ForecastResult {
    /// The daily forecast trimmed to the week starting today at this location.
    pub fn week(&self, now: DateTime<Utc>) -> DailyBlock {
        projector::project(Some(&self.daily), &self.timezone, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springfield() -> Suggestion {
        Suggestion {
            id: 1,
            name: "Springfield".into(),
            admin1: Some("Illinois".into()),
            country_code: "US".into(),
            latitude: 39.8,
            longitude: -89.6,
        }
    }

    #[test]
    fn label_includes_region_when_present() {
        assert_eq!(springfield().label(), "Springfield, Illinois US");

        let mut s = springfield();
        s.admin1 = None;
        assert_eq!(s.label(), "Springfield, US");
    }

    #[test]
    fn coordinates_reject_out_of_range_and_non_finite() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert_eq!(Coordinates::new(90.1, 0.0), Err(WeatherError::InvalidCoordinates));
        assert_eq!(Coordinates::new(0.0, -180.5), Err(WeatherError::InvalidCoordinates));
        assert_eq!(Coordinates::new(f64::NAN, 0.0), Err(WeatherError::InvalidCoordinates));
        assert_eq!(Coordinates::new(0.0, f64::INFINITY), Err(WeatherError::InvalidCoordinates));
    }

    #[test]
    fn suggestion_coordinates() {
        let coords = springfield().coordinates().expect("valid coordinates");
        assert_eq!(coords.latitude(), 39.8);
        assert_eq!(coords.longitude(), -89.6);
        assert_eq!(coords.to_string(), "39.80°N, 89.60°W");
    }

    #[test]
    fn suggestion_decodes_without_region() {
        let json = r#"{"id":7,"name":"Oslo","country_code":"NO","latitude":59.9,"longitude":10.7}"#;
        let s: Suggestion = serde_json::from_str(json).expect("decodes");
        assert_eq!(s.admin1, None);
        assert!(s.has_valid_coordinates());
    }

    #[test]
    fn daily_block_alignment() {
        let mut daily = DailyBlock {
            time: vec!["2024-01-01".into()],
            weather_code: vec![0],
            temperature_max: vec![40.0],
            temperature_min: vec![30.0],
        };
        assert!(daily.is_aligned());
        daily.temperature_min.clear();
        assert!(!daily.is_aligned());
    }
}
