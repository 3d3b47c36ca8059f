use std::fmt;

use crate::text::is_word_char;

/// DOM-safe identifier derived from an entity display name.
///
/// Every character up to U+00C0 that is not an ASCII word character becomes
/// `-`, then the whole string is lower-cased. Characters above U+00C0 pass
/// through untouched, so accented names keep their letters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomId(String);

impl DomId {
    pub fn from_name(name: &str) -> Self {
        let replaced: String = name
            .chars()
            .map(|c| {
                if (c as u32) <= 0xC0 && !is_word_char(c) {
                    '-'
                } else {
                    c
                }
            })
            .collect();
        DomId(replaced.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the per-entity link record, relative to the data prefix.
    pub fn links_file(&self) -> String {
        format!("{}-links.json", self.0)
    }
}

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
