//! WMO weather interpretation codes as reported by Open-Meteo.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCodeEntry {
    pub code: i32,
    pub description: &'static str,
    pub icon: &'static str,
}

const fn entry(code: i32, description: &'static str, icon: &'static str) -> WeatherCodeEntry {
    WeatherCodeEntry { code, description, icon }
}

/// Shown for any code outside [`WEATHER_CODES`].
pub const UNKNOWN: WeatherCodeEntry = entry(-1, "Unknown", "❔");

/// Sorted by code.
pub const WEATHER_CODES: &[WeatherCodeEntry] = &[
    entry(0, "Clear sky", "☀️"),
    entry(1, "Mainly clear", "🌤️"),
    entry(2, "Partly cloudy", "⛅"),
    entry(3, "Overcast", "☁️"),
    entry(45, "Fog", "🌫️"),
    entry(48, "Rime fog", "🌫️"),
    entry(51, "Light drizzle", "🌧️"),
    entry(53, "Moderate drizzle", "🌧️"),
    entry(55, "Dense drizzle", "🌧️"),
    entry(56, "Light freezing drizzle", "🌨️"),
    entry(57, "Dense freezing drizzle", "🌨️"),
    entry(61, "Slight rain", "🌦️"),
    entry(63, "Moderate rain", "🌧️"),
    entry(65, "Heavy rain", "🌧️"),
    entry(66, "Light freezing rain", "🌨️"),
    entry(67, "Heavy freezing rain", "🌨️"),
    entry(71, "Slight snow", "❄️"),
    entry(73, "Moderate snow", "❄️"),
    entry(75, "Heavy snow", "❄️"),
    entry(77, "Snow grains", "🌨️"),
    entry(80, "Slight rain showers", "🌦️"),
    entry(81, "Moderate rain showers", "🌧️"),
    entry(82, "Violent rain showers", "🌧️"),
    entry(85, "Slight snow showers", "🌨️"),
    entry(86, "Heavy snow showers", "🌨️"),
    entry(95, "Thunderstorm", "⛈️"),
    entry(96, "Thunderstorm with hail", "⛈️"),
    entry(99, "Heavy thunderstorm with hail", "⛈️"),
];

/// Look up a code, falling back to [`UNKNOWN`] instead of failing.
pub fn lookup(code: i32) -> &'static WeatherCodeEntry {
    match WEATHER_CODES.binary_search_by_key(&code, |e| e.code) {
        Ok(idx) => &WEATHER_CODES[idx],
        Err(_) => {
            tracing::debug!(code, "unmapped weather code");
            &UNKNOWN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(WEATHER_CODES.windows(2).all(|w| w[0].code < w[1].code));
        assert_eq!(WEATHER_CODES.len(), 28);
    }

    #[test]
    fn known_codes() {
        assert_eq!(lookup(0).description, "Clear sky");
        assert_eq!(lookup(48).description, "Rime fog");
        assert_eq!(lookup(99).description, "Heavy thunderstorm with hail");
        assert_eq!(lookup(3).icon, "☁️");
        assert_eq!(lookup(82).code, 82);
    }

    #[test]
    fn unknown_codes_use_placeholder() {
        assert_eq!(lookup(4), &UNKNOWN);
        assert_eq!(lookup(-7).description, "Unknown");
        assert_eq!(lookup(100).code, UNKNOWN.code);
    }
}
