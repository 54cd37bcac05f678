// Tile layout domain models
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::chart::ChartRange;
use super::sensor::SensorKind;

pub const OVERVIEW_TILE_ID: &str = "overview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileKind {
    Overview,
    Chart { sensor: SensorKind },
    Empty,
}

/// Typed settings plus a forward-compatible bag for keys this version
/// doesn't know about.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ChartRange>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TileSettings {
    /// Merge a partial settings object. `null` clears a key; an unparseable
    /// `range` is skipped and reported back.
    pub fn merge(&mut self, patch: Map<String, Value>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for (key, value) in patch {
            if key == "range" {
                match value {
                    Value::Null => {
                        outcome.changed |= self.range.take().is_some();
                    }
                    other => match serde_json::from_value::<ChartRange>(other.clone()) {
                        Ok(range) => {
                            outcome.changed |= self.range != Some(range);
                            self.range = Some(range);
                        }
                        Err(_) => outcome.rejected.push((key, other)),
                    },
                }
                continue;
            }

            match value {
                Value::Null => {
                    outcome.changed |= self.extra.remove(&key).is_some();
                }
                other => {
                    outcome.changed |= self.extra.get(&key) != Some(&other);
                    self.extra.insert(key, other);
                }
            }
        }
        outcome
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub changed: bool,
    pub rejected: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub id: String,
    pub kind: TileKind,
    #[serde(default)]
    pub settings: TileSettings,
}

impl TileDescriptor {
    pub fn new(id: impl Into<String>, kind: TileKind) -> Self {
        Self {
            id: id.into(),
            kind,
            settings: TileSettings::default(),
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, TileKind::Empty)
    }

    pub fn chart(id: impl Into<String>, sensor: SensorKind) -> Self {
        Self::new(id, TileKind::Chart { sensor })
    }

    /// Range the chart should open with
    pub fn chart_range(&self) -> ChartRange {
        self.settings.range.unwrap_or_default()
    }
}

/// Layout shown on first start or when stored state can't be read
pub fn default_tiles() -> Vec<TileDescriptor> {
    vec![
        TileDescriptor::new(OVERVIEW_TILE_ID, TileKind::Overview),
        TileDescriptor::chart("2", SensorKind::Temperature),
        TileDescriptor::chart("3", SensorKind::Humidity),
        TileDescriptor::chart("4", SensorKind::LightIntensity),
    ]
}

/// Persisted entry. Older layouts stored only the tile ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredTile {
    Descriptor(TileDescriptor),
    Legacy(String),
}

impl From<StoredTile> for TileDescriptor {
    fn from(stored: StoredTile) -> Self {
        match stored {
            StoredTile::Descriptor(descriptor) => descriptor,
            StoredTile::Legacy(id) if id == OVERVIEW_TILE_ID => {
                TileDescriptor::new(id, TileKind::Overview)
            }
            StoredTile::Legacy(id) => TileDescriptor::empty(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_descriptor_json_shape() {
        let mut tile = TileDescriptor::chart("2", SensorKind::WaterLevel);
        tile.settings.range = Some(ChartRange::ThreeDays);
        let value = serde_json::to_value(&tile).unwrap();
        assert_eq!(
            value,
            json!({"id": "2", "kind": {"type": "chart", "sensor": "water_level"}, "settings": {"range": "3d"}})
        );
        let back: TileDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(back, tile);
    }

    #[test]
    fn test_unknown_settings_survive_round_trip() {
        let raw = json!({"id": "x", "kind": {"type": "empty"}, "settings": {"color": "#84cc16"}});
        let tile: TileDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(tile.settings.extra.get("color"), Some(&json!("#84cc16")));
        assert_eq!(serde_json::to_value(&tile).unwrap(), raw);
    }

    #[test]
    fn test_merge_leaves_other_keys() {
        let mut settings = TileSettings::default();
        settings.extra.insert("color".into(), json!("red"));

        let outcome = settings.merge(patch(json!({"range": "7d"})));
        assert!(outcome.changed);
        assert_eq!(settings.range, Some(ChartRange::SevenDays));
        assert_eq!(settings.extra.get("color"), Some(&json!("red")));

        let outcome = settings.merge(patch(json!({"range": "7d"})));
        assert!(!outcome.changed);
    }

    #[test]
    fn test_merge_null_clears_and_bad_range_rejected() {
        let mut settings = TileSettings {
            range: Some(ChartRange::ThreeDays),
            extra: patch(json!({"color": "red"})),
        };

        let outcome = settings.merge(patch(json!({"range": "2w", "color": null})));
        assert!(outcome.changed);
        assert_eq!(settings.range, Some(ChartRange::ThreeDays));
        assert!(settings.extra.is_empty());
        assert_eq!(outcome.rejected.len(), 1);

        settings.merge(patch(json!({"range": null})));
        assert_eq!(settings.range, None);
    }

    #[test]
    fn test_legacy_ids_decode() {
        let stored: Vec<StoredTile> = serde_json::from_str(r#"["overview", "2", "k3j9x1a"]"#).unwrap();
        let tiles: Vec<TileDescriptor> = stored.into_iter().map(Into::into).collect();
        assert_eq!(tiles[0].kind, TileKind::Overview);
        assert_eq!(tiles[1], TileDescriptor::empty("2"));
        assert_eq!(tiles[2].id, "k3j9x1a");
    }
}
