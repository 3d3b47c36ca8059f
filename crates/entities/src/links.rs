use serde_json::{Map, Value};

use crate::EntityError;

/// Directed relations (source name → target name) loaded for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRecord {
    pairs: Vec<(String, String)>,
}

/// Related names split by whether they touch the viewed entity directly.
///
/// Both lists are de-duplicated and keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPartition {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl LinkRecord {
    pub fn from_json(raw: &str) -> Result<Self, EntityError> {
        let map: Map<String, Value> =
            serde_json::from_str(raw).map_err(|source| EntityError::Malformed {
                what: "link record",
                source,
            })?;
        let pairs = map
            .into_iter()
            .filter_map(|(source, target)| match target {
                Value::String(target) => Some((source, target)),
                _ => None,
            })
            .collect();
        Ok(Self { pairs })
    }

    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(a, b)| (a.into(), b.into())).collect(),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Links where `name` is an endpoint are primary (the other endpoint is
    /// recorded); links between two other entities contribute both endpoints
    /// to the secondary set.
    pub fn partition(&self, name: &str) -> LinkPartition {
        let mut out = LinkPartition::default();
        for (source, target) in &self.pairs {
            if source == name {
                push_unique(&mut out.primary, target);
            } else if target == name {
                push_unique(&mut out.primary, source);
            } else {
                push_unique(&mut out.secondary, source);
                push_unique(&mut out.secondary, target);
            }
        }
        out
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_direct_and_indirect_links() {
        let links = LinkRecord::from_json(r#"{"X":"Y","A":"B"}"#).unwrap();
        let p = links.partition("Y");
        assert_eq!(p.primary, vec!["X".to_string()]);
        assert_eq!(p.secondary, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn entity_as_source_links_to_target() {
        let links = LinkRecord::from_pairs([("Y", "Z"), ("Q", "Y"), ("Z", "Q")]);
        let p = links.partition("Y");
        assert_eq!(p.primary, vec!["Z".to_string(), "Q".to_string()]);
        assert_eq!(p.secondary, vec!["Z".to_string(), "Q".to_string()]);
    }

    #[test]
    fn duplicate_endpoints_collapse() {
        let links = LinkRecord::from_pairs([("A", "B"), ("B", "C"), ("C", "A")]);
        let p = links.partition("Nobody");
        assert!(p.primary.is_empty());
        assert_eq!(p.secondary, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn non_string_targets_are_ignored() {
        let links = LinkRecord::from_json(r#"{"A":"B","C":3}"#).unwrap();
        assert_eq!(links.pairs().len(), 1);
    }
}
