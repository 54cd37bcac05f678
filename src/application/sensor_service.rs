// Sensor service - Use case for the "Current Values" overview
use crate::application::sensor_repository::{ApiError, SensorRepository};
use crate::domain::overview::Overview;
use crate::domain::sensor::{SensorKind, SensorRecord, sort_newest_first};
use std::sync::Arc;

#[derive(Clone)]
pub struct SensorService {
    repository: Arc<dyn SensorRepository>,
}

impl SensorService {
    pub fn new(repository: Arc<dyn SensorRepository>) -> Self {
        Self { repository }
    }

    /// Most recent record for one sensor, or `None` when the feed is empty
    pub async fn fetch_latest(&self, kind: SensorKind) -> Result<Option<SensorRecord>, ApiError> {
        let mut records = self.repository.fetch_all(kind).await?;
        sort_newest_first(&mut records);
        Ok(records.into_iter().next())
    }

    /// Fetches all five feeds concurrently. Any failure fails the whole
    /// overview; dropping the future discards whatever already arrived.
    pub async fn fetch_overview(&self) -> Result<Overview, ApiError> {
        let (temperature, humidity, water_level, light_intensity, diodes) = futures::try_join!(
            self.fetch_latest(SensorKind::Temperature),
            self.fetch_latest(SensorKind::Humidity),
            self.fetch_latest(SensorKind::WaterLevel),
            self.fetch_latest(SensorKind::LightIntensity),
            self.fetch_latest(SensorKind::Diodes),
        )
        .inspect_err(|e| tracing::warn!("Overview fetch failed: {}", e))?;

        Ok(Overview {
            temperature,
            humidity,
            water_level,
            light_intensity,
            diodes,
        })
    }
}
