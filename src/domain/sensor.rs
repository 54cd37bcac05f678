// Sensor domain models
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five sensor feeds exposed by the terrarium data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Humidity,
    WaterLevel,
    LightIntensity,
    Diodes,
}

impl SensorKind {
    pub const ALL: [SensorKind; 5] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::WaterLevel,
        SensorKind::LightIntensity,
        SensorKind::Diodes,
    ];

    /// Resource segment under `/api/db/`
    pub fn resource(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperatures",
            SensorKind::Humidity => "humidities",
            SensorKind::WaterLevel => "water-levels",
            SensorKind::LightIntensity => "light-intensity",
            SensorKind::Diodes => "diodes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
            SensorKind::WaterLevel => "Water level",
            SensorKind::LightIntensity => "Light intensity",
            SensorKind::Diodes => "Status",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity | SensorKind::WaterLevel | SensorKind::LightIntensity => "%",
            SensorKind::Diodes => "",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::WaterLevel => "water_level",
            SensorKind::LightIntensity => "light_intensity",
            SensorKind::Diodes => "diodes",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.resource() == s)
            .ok_or_else(|| format!("unknown sensor kind: {}", s))
    }
}

/// A single reading: numeric for the analog sensors, boolean for the diodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Status(bool),
}

impl Reading {
    /// Numeric form used for charting; status records plot as 1/0
    pub fn as_f64(&self) -> f64 {
        match self {
            Reading::Value(v) => *v,
            Reading::Status(true) => 1.0,
            Reading::Status(false) => 0.0,
        }
    }
}

/// Immutable record as delivered by the data API
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub id: String,
    pub date: DateTime<FixedOffset>,
    pub reading: Reading,
}

impl SensorRecord {
    pub fn new(id: String, date: DateTime<FixedOffset>, reading: Reading) -> Self {
        Self { id, date, reading }
    }
}

/// Wire shape of a record: `{_id, date, value}` or `{_id, date, status}`
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub status: Option<bool>,
}

impl From<RawRecord> for SensorRecord {
    fn from(raw: RawRecord) -> Self {
        let reading = match raw.value {
            Some(v) => Reading::Value(v),
            None => Reading::Status(raw.status.unwrap_or(false)),
        };
        SensorRecord::new(raw.id, raw.date, reading)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub skip: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeData<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Response wrapper returned by every `/api/db` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: EnvelopeData<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Most recent record first; ties keep their original order
pub fn sort_newest_first(records: &mut [SensorRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}
