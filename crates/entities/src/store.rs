use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::EntityError;
use crate::entity::Entity;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKind {
    Topics,
    People,
    Institutions,
}

impl CollectionKind {
    /// Lookup precedence when a bare name is resolved.
    pub const LOOKUP_ORDER: [CollectionKind; 3] = [
        CollectionKind::Topics,
        CollectionKind::People,
        CollectionKind::Institutions,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topics" => Some(CollectionKind::Topics),
            "people" => Some(CollectionKind::People),
            "institutions" => Some(CollectionKind::Institutions),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Topics => "topics",
            CollectionKind::People => "people",
            CollectionKind::Institutions => "institutions",
        }
    }

    pub fn data_file(self) -> String {
        format!("{}.json", self.as_str())
    }
}

/// Name → entity mapping that remembers the order names were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: Vec<(String, Entity)>,
    index: HashMap<String, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a data file: a JSON object from entity name to record.
    ///
    /// Records that are not objects are dropped rather than failing the whole
    /// collection.
    pub fn from_json(raw: &str) -> Result<Self, EntityError> {
        let map: Map<String, Value> =
            serde_json::from_str(raw).map_err(|source| EntityError::Malformed {
                what: "entity collection",
                source,
            })?;

        let mut out = Collection::new();
        for (name, record) in map {
            match record {
                Value::Object(fields) => out.insert(name, Entity::from_fields(fields)),
                other => {
                    tracing::debug!(%name, kind = ?other, "skipping non-object entity record");
                }
            }
        }
        Ok(out)
    }

    /// Inserts or replaces. A replaced entity keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, entity: Entity) {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            self.entries[i].1 = entity;
            return;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, entity));
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> + '_ {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }
}

impl<N: Into<String>> FromIterator<(N, Entity)> for Collection {
    fn from_iter<I: IntoIterator<Item = (N, Entity)>>(iter: I) -> Self {
        let mut out = Collection::new();
        for (name, entity) in iter {
            out.insert(name, entity);
        }
        out
    }
}

/// Result of a cross-collection lookup, tagged with where the entity lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub kind: CollectionKind,
    pub name: &'a str,
    pub entity: &'a Entity,
}

/// The three named collections, each populated once when its data arrives.
#[derive(Debug, Default)]
pub struct EntityStore {
    collections: BTreeMap<CollectionKind, Collection>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, kind: CollectionKind, collection: Collection) {
        tracing::info!(collection = kind.as_str(), entities = collection.len(), "collection loaded");
        self.collections.insert(kind, collection);
    }

    pub fn is_loaded(&self, kind: CollectionKind) -> bool {
        self.collections.contains_key(&kind)
    }

    pub fn collection(&self, kind: CollectionKind) -> Option<&Collection> {
        self.collections.get(&kind)
    }

    /// Searches topics, then people, then institutions. Collections that
    /// have not loaded yet are skipped, so early lookups observe "not found".
    pub fn lookup<'a>(&'a self, name: &'a str) -> Option<Resolved<'a>> {
        CollectionKind::LOOKUP_ORDER.iter().find_map(|&kind| {
            let entity = self.collections.get(&kind)?.get(name)?;
            Some(Resolved { kind, name, entity })
        })
    }

    /// Resolves names in order, silently dropping the unresolvable ones.
    pub fn resolve_all<'a, I>(&'a self, names: I) -> Vec<Resolved<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().filter_map(|n| self.lookup(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> Entity {
        serde_json::from_value(json!({ "name": name })).unwrap()
    }

    #[test]
    fn collection_keeps_file_order() {
        let c = Collection::from_json(r#"{"Zeta":{},"Alpha":{},"Mid":{"image":"m.png"}}"#).unwrap();
        let names: Vec<&str> = c.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert!(c.get("Mid").unwrap().has_image());
    }

    #[test]
    fn collection_drops_non_object_records() {
        let c = Collection::from_json(r#"{"A":{},"B":"oops","C":null}"#).unwrap();
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn collection_rejects_non_object_file() {
        assert!(Collection::from_json("[1,2]").is_err());
    }

    #[test]
    fn replaced_entity_keeps_position() {
        let mut c = Collection::new();
        c.insert("a", named("first"));
        c.insert("b", named("b"));
        c.insert("a", named("second"));
        let names: Vec<&str> = c.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(c.get("a"), Some(&named("second")));
    }

    #[test]
    fn lookup_prefers_topics_then_people_then_institutions() {
        let mut store = EntityStore::new();
        store.load(
            CollectionKind::Institutions,
            [("Shared", named("inst")), ("Bank", named("bank"))].into_iter().collect(),
        );
        assert_eq!(store.lookup("Shared").unwrap().kind, CollectionKind::Institutions);

        store.load(CollectionKind::People, [("Shared", named("person"))].into_iter().collect());
        let hit = store.lookup("Shared").unwrap();
        assert_eq!(hit.kind, CollectionKind::People);
        assert_eq!(hit.entity, &named("person"));
        assert_eq!(store.lookup("Bank").unwrap().kind, CollectionKind::Institutions);
    }

    #[test]
    fn lookup_before_load_is_not_found() {
        let store = EntityStore::new();
        assert!(store.lookup("Anything").is_none());
        assert!(!store.is_loaded(CollectionKind::Topics));
    }

    #[test]
    fn resolve_all_skips_unknown_names() {
        let mut store = EntityStore::new();
        store.load(CollectionKind::Topics, [("Oil", named("oil"))].into_iter().collect());
        let hits = store.resolve_all(["Gold", "Oil"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Oil");
    }

    #[test]
    fn parses_collection_kinds() {
        assert_eq!(CollectionKind::parse(" People "), Some(CollectionKind::People));
        assert_eq!(CollectionKind::parse("planets"), None);
        assert_eq!(CollectionKind::Topics.data_file(), "topics.json");
    }
}
