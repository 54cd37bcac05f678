// Chart domain models
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::sensor::SensorRecord;

/// Fixed lookback windows offered by a chart tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartRange {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "7d")]
    SevenDays,
}

impl ChartRange {
    pub const ALL: [ChartRange; 3] = [ChartRange::OneDay, ChartRange::ThreeDays, ChartRange::SevenDays];

    pub fn days(&self) -> i64 {
        match self {
            ChartRange::OneDay => 1,
            ChartRange::ThreeDays => 3,
            ChartRange::SevenDays => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::ThreeDays => "3d",
            ChartRange::SevenDays => "7d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1 Day",
            ChartRange::ThreeDays => "3 Days",
            ChartRange::SevenDays => "7 Days",
        }
    }

    /// Lenient parse used for query strings; anything unknown is the 1 day window
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// `[start, end]` as UTC calendar dates anchored on `now`
    pub fn window(&self, now: DateTime<Utc>) -> DateWindow {
        DateWindow {
            start: (now - Duration::days(self.days())).date_naive(),
            end: now.date_naive(),
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(ChartRange::OneDay),
            "3d" => Ok(ChartRange::ThreeDays),
            "7d" => Ok(ChartRange::SevenDays),
            other => Err(format!("unknown chart range: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `YYYY-MM-DD` pair as sent in the `startDate`/`endDate` query
    pub fn query_dates(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

/// Uniform `{date, value}` point handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn from_record(record: &SensorRecord) -> Self {
        Self {
            date: format_local(&record.date),
            value: record.reading.as_f64(),
        }
    }
}

/// en-US style `M/D/YYYY, h:mm:ss AM` in the local timezone
pub fn format_local<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Per-tile chart state: `idle -> loading -> ready | error`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartState {
    #[default]
    Idle,
    Loading {
        range: ChartRange,
    },
    Ready {
        range: ChartRange,
        points: Vec<ChartPoint>,
    },
    Error {
        range: ChartRange,
        message: String,
    },
}

impl ChartState {
    pub fn range(&self) -> Option<ChartRange> {
        match self {
            ChartState::Idle => None,
            ChartState::Loading { range }
            | ChartState::Ready { range, .. }
            | ChartState::Error { range, .. } => Some(*range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_seven_day_window() {
        let window = ChartRange::SevenDays.window(at("2026-10-18T10:30:00Z"));
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 10, 11).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(
            window.query_dates(),
            ("2026-10-11".to_string(), "2026-10-18".to_string())
        );
    }

    #[test]
    fn test_window_crosses_month_boundary() {
        let window = ChartRange::ThreeDays.window(at("2026-03-01T00:15:00Z"));
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 2, 26).unwrap());

        let window = ChartRange::OneDay.window(at("2026-01-01T23:59:59Z"));
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("3d".parse::<ChartRange>().unwrap(), ChartRange::ThreeDays);
        assert!("2w".parse::<ChartRange>().is_err());
        assert_eq!(ChartRange::parse_or_default(Some("7d")), ChartRange::SevenDays);
        assert_eq!(ChartRange::parse_or_default(Some("bogus")), ChartRange::OneDay);
        assert_eq!(ChartRange::parse_or_default(None), ChartRange::OneDay);
    }

    #[test]
    fn test_range_serializes_as_short_name() {
        assert_eq!(serde_json::to_string(&ChartRange::SevenDays).unwrap(), "\"7d\"");
    }
}
