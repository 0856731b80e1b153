//! Alignment of the hourly forecast series with the wall clock.
//!
//! The forecast service returns timestamps already localized to the
//! location's timezone, so matching is a literal ISO prefix comparison —
//! no timezone math anywhere in this module.

use chrono::{NaiveDate, NaiveDateTime};

/// The hourly indices sharing one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    /// The `YYYY-MM-DD` date key.
    pub date: String,
    /// Weekday label for the picker, "—" if the date doesn't parse.
    pub label: String,
    pub indices: Vec<usize>,
}

/// Finds the sample whose timestamp shares the same year-month-day-hour as
/// `now`, comparing the 13-char `YYYY-MM-DDTHH` prefix as a string.
///
/// Returns `None` when no sample matches; callers must treat that as "no
/// data available", never as index 0.
pub fn find_current_hour_index(timestamps: &[String], now: NaiveDateTime) -> Option<usize> {
    let prefix = now.format("%Y-%m-%dT%H").to_string();
    timestamps
        .iter()
        .position(|ts| ts.get(0..13) == Some(prefix.as_str()))
}

/// Partitions hourly indices into groups keyed by their calendar date
/// (10-char prefix), preserving the first-seen order of distinct dates.
/// Timestamps too short to carry a date are skipped.
pub fn group_by_calendar_day(timestamps: &[String]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = ts.get(0..10) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.indices.push(i),
            None => groups.push(DayGroup {
                date: date.to_string(),
                label: weekday_label(date),
                indices: vec![i],
            }),
        }
    }
    groups
}

fn weekday_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%A").to_string(),
        Err(_) => crate::units::MISSING.to_string(),
    }
}

/// Short weekday name ("Mon") for a `YYYY-MM-DD` date, placeholder when the
/// date doesn't parse.
pub fn short_weekday(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%a").to_string(),
        Err(_) => crate::units::MISSING.to_string(),
    }
}

/// 12-hour clock label ("3 PM") for an hourly ISO timestamp.
pub fn clock_label(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M") {
        Ok(dt) => dt.format("%-I %p").to_string(),
        Err(_) => crate::units::MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn matches_the_hour_prefix() {
        let series = vec![
            "2024-01-01T00:00".to_string(),
            "2024-01-01T01:00".to_string(),
            "2024-01-01T02:00".to_string(),
        ];
        assert_eq!(
            find_current_hour_index(&series, ts("2024-01-01T01:30")),
            Some(1)
        );
    }

    #[test]
    fn no_match_is_none_not_zero() {
        assert_eq!(find_current_hour_index(&[], ts("2024-01-01T01:30")), None);
        let series = vec!["2024-01-02T00:00".to_string()];
        assert_eq!(
            find_current_hour_index(&series, ts("2024-01-01T00:30")),
            None
        );
    }

    #[test]
    fn groups_two_days_in_encounter_order() {
        let mut series = Vec::new();
        for h in 0..24 {
            series.push(format!("2024-03-09T{h:02}:00"));
        }
        for h in 0..24 {
            series.push(format!("2024-03-10T{h:02}:00"));
        }
        let groups = group_by_calendar_day(&series);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, "2024-03-09");
        assert_eq!(groups[0].indices.len(), 24);
        assert_eq!(groups[0].label, "Saturday");
        assert_eq!(groups[1].date, "2024-03-10");
        assert_eq!(groups[1].indices.len(), 24);
        assert_eq!(groups[1].label, "Sunday");
        assert_eq!(groups[1].indices[0], 24);
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let series = vec![
            "2024-03-09T00:00".to_string(),
            "bad".to_string(),
            "2024-03-09T01:00".to_string(),
        ];
        let groups = group_by_calendar_day(&series);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].indices, vec![0, 2]);
    }

    #[test]
    fn labels_for_display() {
        assert_eq!(short_weekday("2024-03-09"), "Sat");
        assert_eq!(short_weekday("not-a-date"), "—");
        assert_eq!(clock_label("2024-03-09T15:00"), "3 PM");
        assert_eq!(clock_label("2024-03-09T00:00"), "12 AM");
        assert_eq!(clock_label("garbage"), "—");
    }
}
