use foundation::PlacementRules;
use journal::JournalKeys;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Explorer tuning knobs. Every field has a default, so hosts only pass the
/// values they want to change (see `configure`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Tiles rendered up front, and per lazy-load step.
    pub page_size: usize,
    /// Distance from the document bottom that triggers a lazy-load step.
    pub scroll_threshold_px: f64,
    /// Hover time before a temporary bubble opens.
    pub hover_delay_ms: u32,
    pub grid_px: f64,
    pub bubble_side_margin_px: f64,
    pub bubble_edge_margin_px: f64,
    /// Offset of note tooltips and the note popup from the pointer.
    pub tooltip_offset_px: f64,
    pub first_z_index: u32,
    pub data_prefix: String,
    pub image_prefix: String,
    pub notes_key: String,
    pub history_key: String,
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub marker_icon: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let keys = JournalKeys::default();
        Self {
            page_size: 100,
            scroll_threshold_px: 300.0,
            hover_delay_ms: 300,
            grid_px: 200.0,
            bubble_side_margin_px: 100.0,
            bubble_edge_margin_px: 50.0,
            tooltip_offset_px: 20.0,
            first_z_index: 100,
            data_prefix: "/json/".to_string(),
            image_prefix: "/images/".to_string(),
            notes_key: keys.notes,
            history_key: keys.history,
            map: MapConfig::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 30.53,
            center_lng: -1.69,
            zoom: 3.0,
            marker_icon: "/triangle-32.png".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Parses and validates; the result is always usable as-is.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.page_size == 0 {
            return invalid("page_size", "must be at least 1");
        }
        if !(self.grid_px.is_finite() && self.grid_px > 0.0) {
            return invalid("grid_px", "must be a positive number");
        }
        let non_negative = [
            ("scroll_threshold_px", self.scroll_threshold_px),
            ("bubble_side_margin_px", self.bubble_side_margin_px),
            ("bubble_edge_margin_px", self.bubble_edge_margin_px),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(field, "must be a finite number >= 0");
            }
        }
        let finite = [
            ("tooltip_offset_px", self.tooltip_offset_px),
            ("map.center_lat", self.map.center_lat),
            ("map.center_lng", self.map.center_lng),
            ("map.zoom", self.map.zoom),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return invalid(field, "must be a finite number");
            }
        }
        Ok(())
    }

    pub fn placement(&self) -> PlacementRules {
        PlacementRules {
            grid_px: self.grid_px,
            side_margin_px: self.bubble_side_margin_px,
            edge_margin_px: self.bubble_edge_margin_px,
        }
    }

    pub fn journal_keys(&self) -> JournalKeys {
        JournalKeys {
            notes: self.notes_key.clone(),
            history: self.history_key.clone(),
        }
    }

    pub fn image_url(&self, file: &str) -> String {
        format!("{}{}", self.image_prefix, file)
    }
}
