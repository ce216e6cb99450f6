//! Human-friendly output.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use weather_core::{Coordinates, DailyBlock, ForecastResult, projector::Zone, weather_code};

pub const ATTRIBUTION: &str = "Weather data from Open-Meteo (https://open-meteo.com/)";

/// Hourly entries shown below the current conditions.
pub const HOURS_SHOWN: usize = 24;

/// Machine-readable output for `--json`.
#[derive(Debug, Serialize)]
pub struct JsonView<'a> {
    pub location: Option<&'a str>,
    pub forecast: &'a ForecastResult,
    pub week: &'a DailyBlock,
}

pub fn render_json(
    location: Option<&str>,
    forecast: &ForecastResult,
    week: &DailyBlock,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonView {
        location,
        forecast,
        week,
    })
}

pub fn render_forecast(location: Option<&str>, forecast: &ForecastResult, week: &DailyBlock) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_forecast(&mut out, location, forecast, week);
    out
}

pub fn write_forecast(
    out: &mut impl fmt::Write,
    location: Option<&str>,
    forecast: &ForecastResult,
    week: &DailyBlock,
) -> fmt::Result {
    let zone = location_zone(forecast);

    if let Some(location) = location {
        writeln!(out, "{location}")?;
    }
    let coordinates = Coordinates::new(forecast.latitude, forecast.longitude)
        .map(|c| c.to_string())
        .unwrap_or_else(|_| format!("{}, {}", forecast.latitude, forecast.longitude));
    writeln!(out, "{coordinates} ({})", forecast.timezone)?;
    writeln!(out)?;

    let current = &forecast.current;
    let entry = weather_code::lookup(current.weather_code);
    writeln!(out, "Now: {}°F  {} {}", current.temperature, entry.icon, entry.description)?;
    writeln!(out, "Wind: {} mph", current.wind_speed)?;
    writeln!(out)?;

    writeln!(out, "24-Hour Forecast")?;
    let hourly = &forecast.hourly;
    for ((time, temperature), code) in hourly
        .time
        .iter()
        .zip(&hourly.temperature)
        .zip(&hourly.weather_code)
        .take(HOURS_SHOWN)
    {
        let entry = weather_code::lookup(*code);
        writeln!(
            out,
            "  {}  {:>6}°F  {} {}",
            hour_label(time, zone.as_ref()),
            temperature,
            entry.icon,
            entry.description
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Week Forecast")?;
    for (((time, code), max), min) in week
        .time
        .iter()
        .zip(&week.weather_code)
        .zip(&week.temperature_max)
        .zip(&week.temperature_min)
    {
        let entry = weather_code::lookup(*code);
        writeln!(
            out,
            "  {:<12} {} {:<28} {}°/{}°",
            day_label(time, zone.as_ref()),
            entry.icon,
            entry.description,
            max,
            min
        )?;
    }
    writeln!(out)?;

    out.write_str(ATTRIBUTION)
}

/// The reported timezone, or the reported UTC offset when the name is not recognised.
fn location_zone(forecast: &ForecastResult) -> Option<Zone> {
    Zone::parse(&forecast.timezone)
        .ok()
        .or_else(|| FixedOffset::east_opt(forecast.utc_offset_seconds).map(Zone::Fixed))
}

/// "13:00" for an hourly timestamp; unparseable input is shown as-is.
fn hour_label(raw: &str, zone: Option<&Zone>) -> String {
    if let (Ok(dt), Some(zone)) = (DateTime::parse_from_rfc3339(raw), zone) {
        let utc = dt.with_timezone(&Utc);
        return match zone {
            Zone::Named(tz) => utc.with_timezone(tz).format("%H:00").to_string(),
            Zone::Fixed(offset) => utc.with_timezone(offset).format("%H:00").to_string(),
        };
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|dt| dt.format("%H:00").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// "Wed, Jan 3" for a daily timestamp; unparseable input is shown as-is.
fn day_label(raw: &str, zone: Option<&Zone>) -> String {
    let date = match zone {
        Some(zone) => zone.local_date(raw).ok(),
        None => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
    };
    date.map(|d| d.format("%a, %b %-d").to_string())
        .unwrap_or_else(|| raw.to_string())
}
