//! Projection from session state to display-ready records.
//!
//! Everything here is a pure function of (session, selected day, now); the
//! renderer receives only formatted strings and icon categories, never raw
//! payload objects. Missing values degrade to the "—" placeholder uniformly.

use chrono::NaiveDateTime;

use crate::openmeteo::forecast::{DailySeries, ForecastPayload, HourlySeries};
use crate::session::Session;
use crate::timeline::{self, DayGroup};
use crate::units::{self, MISSING};
use crate::weather::{Condition, PrecipitationUnit, TemperatureUnit, UnitPreferences, WindUnit};

/// The current-conditions card. Named fields, not positional panels.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentCard {
    pub location: String,
    pub date: String,
    pub temperature: String,
    pub icon: Condition,
    /// The service has no independent feels-like reading; this mirrors the
    /// current temperature.
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub precipitation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyEntry {
    pub day: String,
    pub icon: Condition,
    pub high: String,
    pub low: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEntry {
    pub time: String,
    pub icon: Condition,
    pub temperature: String,
}

/// Everything the renderer needs for one frame of weather content.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub current: CurrentCard,
    /// At most 7 entries, index-aligned with the daily series.
    pub daily: Vec<DailyEntry>,
    /// One label per distinct calendar day in the hourly series.
    pub day_picker: Vec<String>,
    pub selected_day: usize,
    /// At most 8 entries for the selected day group.
    pub hourly: Vec<HourlyEntry>,
}

const MAX_DAILY_ENTRIES: usize = 7;
const MAX_HOURLY_ENTRIES: usize = 8;

fn at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

fn code_at(series: &[Option<i32>], index: usize) -> Condition {
    series
        .get(index)
        .copied()
        .flatten()
        .map(Condition::from_code)
        .unwrap_or_default()
}

fn display_temp(celsius: Option<f64>, unit: TemperatureUnit) -> Option<f64> {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius.map(units::temperature::c2f),
    }
}

fn format_wind_ms(ms: Option<f64>, unit: WindUnit) -> String {
    let kmh = ms.map(units::speed::ms2kmh);
    match unit {
        WindUnit::Kmh => units::format_wind(kmh, unit.label()),
        WindUnit::Mph => units::format_wind(kmh.map(units::speed::kmh2mph), unit.label()),
    }
}

fn format_precip(mm: Option<f64>, unit: PrecipitationUnit) -> String {
    match unit {
        PrecipitationUnit::Mm => units::format_precip_mm(mm),
        PrecipitationUnit::Inches => units::format_precip_in(mm.map(units::precip::mm2in)),
    }
}

/// Projects the session onto display records for one frame.
///
/// `selected_day` indexes the day-picker groups and is clamped; `now` is the
/// wall clock in the payload's local time.
pub fn project(session: &Session, selected_day: usize, now: NaiveDateTime) -> Dashboard {
    let units = session.units;
    let payload = session.payload();
    let hourly = payload.and_then(|p| p.hourly.as_ref());
    let daily = payload.and_then(|p| p.daily.as_ref());

    let groups = hourly
        .map(|h| timeline::group_by_calendar_day(&h.time))
        .unwrap_or_default();
    let selected_day = selected_day.min(groups.len().saturating_sub(1));

    Dashboard {
        current: current_card(session, payload, hourly, daily, now, units),
        daily: daily_strip(daily, units.temperature),
        day_picker: groups.iter().map(|g| g.label.clone()).collect(),
        selected_day,
        hourly: hourly_list(hourly, groups.get(selected_day), units.temperature),
    }
}

fn current_card(
    session: &Session,
    payload: Option<&ForecastPayload>,
    hourly: Option<&HourlySeries>,
    daily: Option<&DailySeries>,
    now: NaiveDateTime,
    units: UnitPreferences,
) -> CurrentCard {
    let current = payload.and_then(|p| p.current_weather.as_ref());

    let temp_c = current.and_then(|c| c.temperature);
    let temperature = units::format_temp(display_temp(temp_c, units.temperature));

    let hour_index = hourly.and_then(|h| timeline::find_current_hour_index(&h.time, now));
    let humidity = match (hourly, hour_index) {
        (Some(h), Some(i)) => units::format_humidity(at(&h.relativehumidity_2m, i)),
        _ => MISSING.to_string(),
    };

    // Hourly value for the current hour, else the first daily sum.
    let precip_mm = match (hourly, hour_index) {
        (Some(h), Some(i)) => at(&h.precipitation, i),
        _ => None,
    }
    .or_else(|| daily.and_then(|d| at(&d.precipitation_sum, 0)));

    CurrentCard {
        location: session.location().display_name.clone(),
        date: now.format("%A, %b %-d, %Y").to_string(),
        temperature: temperature.clone(),
        icon: current
            .and_then(|c| c.weathercode)
            .map(Condition::from_code)
            .unwrap_or_default(),
        feels_like: temperature,
        humidity,
        wind: format_wind_ms(current.and_then(|c| c.windspeed), units.wind),
        precipitation: format_precip(precip_mm, units.precipitation),
    }
}

fn daily_strip(daily: Option<&DailySeries>, unit: TemperatureUnit) -> Vec<DailyEntry> {
    let Some(daily) = daily else {
        return Vec::new();
    };
    daily
        .time
        .iter()
        .take(MAX_DAILY_ENTRIES)
        .enumerate()
        .map(|(i, date)| DailyEntry {
            day: timeline::short_weekday(date),
            icon: code_at(&daily.weathercode, i),
            high: units::format_temp(display_temp(at(&daily.temperature_2m_max, i), unit)),
            low: units::format_temp(display_temp(at(&daily.temperature_2m_min, i), unit)),
        })
        .collect()
}

fn hourly_list(
    hourly: Option<&HourlySeries>,
    group: Option<&DayGroup>,
    unit: TemperatureUnit,
) -> Vec<HourlyEntry> {
    let (Some(hourly), Some(group)) = (hourly, group) else {
        return Vec::new();
    };
    group
        .indices
        .iter()
        .take(MAX_HOURLY_ENTRIES)
        .map(|&i| HourlyEntry {
            time: hourly
                .time
                .get(i)
                .map(|ts| timeline::clock_label(ts))
                .unwrap_or_else(|| MISSING.to_string()),
            icon: code_at(&hourly.weathercode, i),
            temperature: units::format_temp(display_temp(at(&hourly.temperature_2m, i), unit)),
        })
        .collect()
}
