// Chart service - Fetches windowed series and tracks per-tile chart state
use crate::application::sensor_repository::{ApiError, SensorRepository};
use crate::domain::chart::{ChartPoint, ChartRange, ChartState};
use crate::domain::sensor::SensorKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub const CHART_LOAD_FAILED: &str = "Failed to load chart data";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Identifies one fetch for one tile. Only the newest ticket per tile may
/// write its result back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub tile_id: String,
    pub generation: u64,
    pub range: ChartRange,
}

#[derive(Debug, Default)]
struct TileChart {
    generation: u64,
    state: ChartState,
}

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn SensorRepository>,
    tiles: Arc<Mutex<HashMap<String, TileChart>>>,
    clock: Clock,
}

impl ChartService {
    pub fn new(repository: Arc<dyn SensorRepository>) -> Self {
        Self {
            repository,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Fetch the series for `range` ending now and map it to chart points
    pub async fn load(&self, kind: SensorKind, range: ChartRange) -> Result<Vec<ChartPoint>, ApiError> {
        let window = range.window((self.clock)());
        tracing::debug!(
            "Fetching {} chart from {} to {}",
            kind,
            window.start,
            window.end
        );
        let records = self.repository.fetch_range(kind, window).await?;
        Ok(records.iter().map(ChartPoint::from_record).collect())
    }

    /// Start a new request for a tile; supersedes any request still in flight
    pub fn begin(&self, tile_id: &str, range: ChartRange) -> RequestTicket {
        let mut tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = tiles.entry(tile_id.to_string()).or_default();
        entry.generation += 1;
        entry.state = ChartState::Loading { range };
        RequestTicket {
            tile_id: tile_id.to_string(),
            generation: entry.generation,
            range,
        }
    }

    /// Apply a finished request. Returns false when a newer request for the
    /// same tile has been issued since, in which case the result is dropped.
    pub fn complete(&self, ticket: &RequestTicket, result: Result<Vec<ChartPoint>, ApiError>) -> bool {
        let mut tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = tiles.get_mut(&ticket.tile_id) else {
            return false;
        };
        if entry.generation != ticket.generation {
            tracing::debug!(
                "Discarding stale chart response for tile {} (generation {} < {})",
                ticket.tile_id,
                ticket.generation,
                entry.generation
            );
            return false;
        }

        entry.state = match result {
            Ok(points) => ChartState::Ready {
                range: ticket.range,
                points,
            },
            Err(e) => {
                tracing::warn!("Chart fetch for tile {} failed: {}", ticket.tile_id, e);
                ChartState::Error {
                    range: ticket.range,
                    message: CHART_LOAD_FAILED.to_string(),
                }
            }
        };
        true
    }

    /// Full cycle for one tile; returns the tile's state afterwards, which
    /// reflects a newer request if this one was superseded
    pub async fn refresh(&self, tile_id: &str, kind: SensorKind, range: ChartRange) -> ChartState {
        let ticket = self.begin(tile_id, range);
        let result = self.load(kind, range).await;
        self.complete(&ticket, result);
        self.state(tile_id)
    }

    pub fn state(&self, tile_id: &str) -> ChartState {
        self.tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tile_id)
            .map(|t| t.state.clone())
            .unwrap_or_default()
    }

    /// Drop tracking for a removed tile
    pub fn forget(&self, tile_id: &str) {
        self.tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tile_id);
    }
}
