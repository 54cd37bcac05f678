// Repository trait for sensor history access
use crate::domain::chart::DateWindow;
use crate::domain::sensor::{SensorKind, SensorRecord};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed envelope from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("API reported failure: {0}")]
    Unsuccessful(String),
}

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Every record the API returns for this sensor, in API order
    async fn fetch_all(&self, kind: SensorKind) -> Result<Vec<SensorRecord>, ApiError>;

    /// Records inside the calendar-date window, in API order
    async fn fetch_range(
        &self,
        kind: SensorKind,
        window: DateWindow,
    ) -> Result<Vec<SensorRecord>, ApiError>;
}
