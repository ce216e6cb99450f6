//! Trims a daily forecast to the week starting "today" at the forecast location.
//!
//! "Today" is the calendar date of `now` in the location's timezone, not the machine's.
//! The computation runs in two steps: [`window_bounds`] finds the slice, and [`project`]
//! applies it. When the bounds cannot be computed the unsliced block is returned as-is.

use std::{ops::Range, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{error::WeatherError, model::DailyBlock};

pub const WINDOW_DAYS: usize = 7;

/// A timezone as reported by the forecast service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    /// Accepts IANA names ("Europe/Berlin") and UTC offsets ("+05:30", "UTC-8", "GMT+2", "Z").
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let raw = raw.trim();
        if let Ok(tz) = Tz::from_str(raw) {
            return Ok(Zone::Named(tz));
        }
        parse_offset(raw)
            .map(Zone::Fixed)
            .ok_or_else(|| WeatherError::Projection(format!("unrecognised timezone '{raw}'")))
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Named(tz) => instant.with_timezone(tz).date_naive(),
            Zone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Calendar date of a forecast timestamp in this zone.
    ///
    /// Date-only and offset-less date-times are already local to the forecast location;
    /// only timestamps with an explicit offset get converted.
    pub fn local_date(&self, raw: &str) -> Result<NaiveDate, WeatherError> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(self.date_of(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(dt.date());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| WeatherError::Projection(format!("malformed timestamp '{raw}'")))
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw.is_empty() {
        return None;
    }
    let rest = raw
        .strip_prefix("UTC")
        .or_else(|| raw.strip_prefix("GMT"))
        .unwrap_or(raw);
    if rest.is_empty() || rest == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    if !digits.is_ascii() {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some(parts) => parts,
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    let numeric = |s: &str| !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(hours) || !numeric(minutes) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Index range of the week that starts at the first day on or after today.
///
/// Falls back to starting at index 0 when every day is in the past.
pub fn window_bounds(
    daily: &DailyBlock,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<Range<usize>, WeatherError> {
    if !daily.is_aligned() {
        return Err(WeatherError::Projection(
            "daily series have different lengths".to_string(),
        ));
    }

    let zone = Zone::parse(timezone)?;
    let today = zone.date_of(now);

    let mut start = None;
    for (idx, raw) in daily.time.iter().enumerate() {
        if zone.local_date(raw)? >= today {
            start = Some(idx);
            break;
        }
    }
    let start = start.unwrap_or(0);
    let end = (start + WINDOW_DAYS).min(daily.len());

    Ok(start..end)
}

/// Week-long view of `daily`; empty when nothing is loaded.
pub fn project(daily: Option<&DailyBlock>, timezone: &str, now: DateTime<Utc>) -> DailyBlock {
    let Some(daily) = daily else {
        return DailyBlock::default();
    };

    match window_bounds(daily, timezone, now) {
        Ok(range) => slice(daily, range),
        Err(err) => {
            tracing::warn!(error = %err, "showing unsliced daily forecast");
            daily.clone()
        }
    }
}

fn slice(daily: &DailyBlock, range: Range<usize>) -> DailyBlock {
    DailyBlock {
        time: daily.time[range.clone()].to_vec(),
        weather_code: daily.weather_code[range.clone()].to_vec(),
        temperature_max: daily.temperature_max[range.clone()].to_vec(),
        temperature_min: daily.temperature_min[range].to_vec(),
    }
}
