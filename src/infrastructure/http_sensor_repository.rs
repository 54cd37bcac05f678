// HTTP sensor repository implementation
use crate::application::sensor_repository::{ApiError, SensorRepository};
use crate::domain::chart::DateWindow;
use crate::domain::sensor::{ApiEnvelope, RawRecord, SensorKind, SensorRecord};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSensorRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, kind: SensorKind) -> String {
        format!("{}/api/db/{}", self.base_url, kind.resource())
    }

    fn range_url(&self, kind: SensorKind, window: DateWindow) -> String {
        let (start, end) = window.query_dates();
        format!(
            "{}/date-range?startDate={}&endDate={}",
            self.collection_url(kind),
            urlencoding::encode(&start),
            urlencoding::encode(&end)
        )
    }

    async fn execute_query(&self, url: &str) -> Result<Vec<SensorRecord>, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let envelope: ApiEnvelope<RawRecord> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.success {
            return Err(ApiError::Unsuccessful(envelope.message));
        }

        let page = &envelope.data.pagination;
        tracing::debug!(
            "{} returned {} of {} records (count {}, skip {}, limit {}) at {}",
            url,
            envelope.data.data.len(),
            page.total,
            page.count,
            page.skip,
            page.limit,
            envelope.timestamp
        );
        Ok(envelope.data.data.into_iter().map(SensorRecord::from).collect())
    }
}

#[async_trait]
impl SensorRepository for HttpSensorRepository {
    async fn fetch_all(&self, kind: SensorKind) -> Result<Vec<SensorRecord>, ApiError> {
        self.execute_query(&self.collection_url(kind)).await
    }

    async fn fetch_range(
        &self,
        kind: SensorKind,
        window: DateWindow,
    ) -> Result<Vec<SensorRecord>, ApiError> {
        self.execute_query(&self.range_url(kind, window)).await
    }
}
