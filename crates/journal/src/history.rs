use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Append-only log of opened entity names, oldest first. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    names: Vec<String>,
}

impl History {
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Most recent first, each name once (at its most recent position).
    pub fn recent_distinct(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.names
            .iter()
            .rev()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use pretty_assertions::assert_eq;

    #[test]
    fn replay_is_most_recent_first_and_distinct() {
        let mut h = History::default();
        for n in ["A", "B", "A", "C"] {
            h.push(n);
        }
        assert_eq!(h.len(), 4);
        assert_eq!(h.recent_distinct(), vec!["C", "A", "B"]);
    }

    #[test]
    fn persists_as_plain_array() {
        let mut h = History::default();
        h.push("A");
        h.push("A");
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"["A","A"]"#);
    }

    #[test]
    fn long_history_replays_each_name_once() {
        let mut h = History::default();
        for i in 0..5_000 {
            h.push(format!("E{}", i % 50));
        }
        let replay = h.recent_distinct();
        assert_eq!(replay.len(), 50);
        assert_eq!(replay[0], "E49");
        assert_eq!(replay[49], "E0");
    }
}
