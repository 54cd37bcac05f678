// Overview ("Current Values") domain model
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::chart::format_local;
use super::sensor::{Reading, SensorKind, SensorRecord};

pub const PLACEHOLDER: &str = "-";

/// Latest record per sensor; `None` where the feed is empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub temperature: Option<SensorRecord>,
    pub humidity: Option<SensorRecord>,
    pub water_level: Option<SensorRecord>,
    pub light_intensity: Option<SensorRecord>,
    pub diodes: Option<SensorRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewItem {
    pub key: SensorKind,
    pub label: &'static str,
    pub value: String,
    /// Only meaningful for the diode row
    pub alarm: bool,
}

impl Overview {
    pub fn get(&self, kind: SensorKind) -> Option<&SensorRecord> {
        match kind {
            SensorKind::Temperature => self.temperature.as_ref(),
            SensorKind::Humidity => self.humidity.as_ref(),
            SensorKind::WaterLevel => self.water_level.as_ref(),
            SensorKind::LightIntensity => self.light_intensity.as_ref(),
            SensorKind::Diodes => self.diodes.as_ref(),
        }
    }

    /// Newest timestamp among the readings that are present
    pub fn latest_update(&self) -> Option<DateTime<FixedOffset>> {
        SensorKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|r| r.date))
            .max()
    }

    pub fn latest_update_display(&self) -> String {
        self.latest_update()
            .map(|at| format_local(&at))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn items(&self) -> Vec<OverviewItem> {
        SensorKind::ALL
            .into_iter()
            .map(|kind| {
                let record = self.get(kind);
                let alarm = matches!(record.map(|r| r.reading), Some(Reading::Status(true)));
                OverviewItem {
                    key: kind,
                    label: kind.label(),
                    value: display_value(kind, record),
                    alarm,
                }
            })
            .collect()
    }
}

fn display_value(kind: SensorKind, record: Option<&SensorRecord>) -> String {
    match (kind, record.map(|r| r.reading)) {
        (SensorKind::Diodes, Some(Reading::Status(true))) => "Problem".to_string(),
        (SensorKind::Diodes, Some(_)) => "OK".to_string(),
        (SensorKind::Diodes, None) => PLACEHOLDER.to_string(),
        (_, Some(reading)) => format!("{} {}", reading.as_f64(), kind.unit()),
        (_, None) => format!("{} {}", PLACEHOLDER, kind.unit()),
    }
}
