use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geocode {
    pub lat: f64,
    pub lng: f64,
}

/// A topic, person or institution record.
///
/// Records are loosely typed, so the raw attribute object is kept as-is and
/// the few fields the explorer acts on are read through accessors. A field
/// counts as present only when it carries a usable value (non-empty string,
/// numeric coordinates).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    fields: Map<String, Value>,
}

impl Entity {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Image file name, relative to the image prefix.
    pub fn image(&self) -> Option<&str> {
        self.non_empty_str("image")
    }

    pub fn has_image(&self) -> bool {
        self.image().is_some()
    }

    pub fn overview(&self) -> Option<&str> {
        self.non_empty_str("overview")
    }

    pub fn geocode(&self) -> Option<Geocode> {
        let geo = self.fields.get("geocode")?.as_object()?;
        Some(Geocode {
            lat: geo.get("lat")?.as_f64()?,
            lng: geo.get("lng")?.as_f64()?,
        })
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}
