// Tile layout manager - Ordered tile collection with write-through persistence
use crate::application::layout_storage::{LayoutStorage, STORAGE_KEY, StorageError};
use crate::domain::tile::{StoredTile, TileDescriptor, TileKind, default_tiles};
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

const ID_LEN: usize = 7;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Owns the on-screen tile order. Every mutation writes the whole sequence
/// back to storage; a failed write is logged and the in-memory state kept.
pub struct TileLayoutManager {
    storage: Arc<dyn LayoutStorage>,
    tiles: Vec<TileDescriptor>,
}

impl TileLayoutManager {
    pub fn open(storage: Arc<dyn LayoutStorage>) -> Self {
        let mut manager = Self {
            storage,
            tiles: Vec::new(),
        };
        manager.load();
        manager
    }

    /// Re-read the layout from storage, falling back to the defaults when
    /// nothing is stored or the stored value can't be parsed.
    pub fn load(&mut self) -> &[TileDescriptor] {
        self.tiles = match self.storage.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<StoredTile>>(&raw) {
                Ok(stored) => dedupe(stored.into_iter().map(Into::into).collect()),
                Err(e) => {
                    tracing::warn!("Ignoring malformed {} value: {}", STORAGE_KEY, e);
                    default_tiles()
                }
            },
            Ok(None) => default_tiles(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", STORAGE_KEY, e);
                default_tiles()
            }
        };
        &self.tiles
    }

    pub fn tiles(&self) -> &[TileDescriptor] {
        &self.tiles
    }

    pub fn get(&self, id: &str) -> Option<&TileDescriptor> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Append an empty tile under a fresh id
    pub fn add(&mut self) -> TileDescriptor {
        let tile = TileDescriptor::empty(self.generate_id());
        tracing::debug!("Adding tile {}", tile.id);
        self.tiles.push(tile.clone());
        self.persist();
        tile
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tiles.len();
        self.tiles.retain(|t| t.id != id);
        if self.tiles.len() == before {
            return false;
        }
        tracing::debug!("Removed tile {}", id);
        self.persist();
        true
    }

    /// Move `source_id` into the slot currently held by `target_id`; every
    /// other tile keeps its relative order.
    pub fn reorder(&mut self, source_id: &str, target_id: &str) -> bool {
        if source_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(source_id), self.position(target_id)) else {
            return false;
        };
        let tile = self.tiles.remove(from);
        self.tiles.insert(to, tile);
        tracing::debug!("Moved tile {} from {} to {}", source_id, from, to);
        self.persist();
        true
    }

    /// Merge a partial settings object into one tile's settings
    pub fn update_settings(&mut self, id: &str, patch: Map<String, Value>) -> bool {
        let Some(tile) = self.tiles.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        let outcome = tile.settings.merge(patch);
        for (key, value) in &outcome.rejected {
            tracing::warn!("Tile {}: ignoring invalid setting {}={}", id, key, value);
        }
        if outcome.changed {
            self.persist();
        }
        outcome.changed
    }

    /// Change what a tile shows; settings from the previous kind are dropped
    pub fn set_kind(&mut self, id: &str, kind: TileKind) -> bool {
        let Some(tile) = self.tiles.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if tile.kind == kind {
            return false;
        }
        tile.kind = kind;
        tile.settings = Default::default();
        self.persist();
        true
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tiles.iter().position(|t| t.id == id)
    }

    fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
                .collect();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.tiles)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&json));
        if let Err(e) = result {
            tracing::error!("Failed to persist {}: {}", STORAGE_KEY, e);
        }
    }
}

fn dedupe(tiles: Vec<TileDescriptor>) -> Vec<TileDescriptor> {
    let mut seen = HashSet::new();
    tiles
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}
