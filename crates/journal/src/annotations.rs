use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Notes for one entity: highlighted text → note text.
///
/// Keys are the literal selected text, so two selections with the same text
/// share one note. Insertion order is kept because highlights are applied
/// in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    notes: Vec<(String, String)>,
}

impl AnnotationSet {
    /// Overwrites in place when the highlight already has a note.
    pub fn insert(&mut self, highlight: impl Into<String>, note: impl Into<String>) {
        let highlight = highlight.into();
        let note = note.into();
        match self.notes.iter_mut().find(|(h, _)| *h == highlight) {
            Some(slot) => slot.1 = note,
            None => self.notes.push((highlight, note)),
        }
    }

    pub fn get(&self, highlight: &str) -> Option<&str> {
        self.notes
            .iter()
            .find(|(h, _)| h == highlight)
            .map(|(_, n)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.notes.iter().map(|(h, n)| (h.as_str(), n.as_str()))
    }
}

impl Serialize for AnnotationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.notes.len()))?;
        for (highlight, note) in &self.notes {
            map.serialize_entry(highlight, note)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnnotationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = AnnotationSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of highlighted text to note text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = AnnotationSet::default();
                while let Some((highlight, note)) = access.next_entry::<String, String>()? {
                    set.insert(highlight, note);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// Every entity's notes, keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    entities: BTreeMap<String, AnnotationSet>,
}

impl Annotations {
    pub fn add(&mut self, entity: &str, highlight: &str, note: &str) {
        self.entities
            .entry(entity.to_string())
            .or_default()
            .insert(highlight, note);
    }

    pub fn notes_for(&self, entity: &str) -> Option<&AnnotationSet> {
        self.entities.get(entity)
    }

    pub fn note(&self, entity: &str, highlight: &str) -> Option<&str> {
        self.notes_for(entity)?.get(highlight)
    }

    /// Annotated entity names in alphabetical order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
