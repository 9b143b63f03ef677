//! Tag normalization, tag sets and tag-frequency analytics.

mod frequency;

pub use frequency::{
    TagFrequency, TagFrequencyAnalyzer, TagStatistics, analyze, extract_all_tags, tag_statistics,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalize a tag for comparison: trimmed and lowercased. Blank tags yield `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// A set of normalized tags.
///
/// Insertion order is irrelevant: iteration is always sorted, which keeps cache
/// keys and serialized preferences deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag after normalization. Returns false for blank or duplicate tags.
    pub fn insert(&mut self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|tag| self.0.insert(tag))
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|tag| self.0.remove(&tag))
    }

    /// Add the tag if absent, remove it otherwise.
    pub fn toggle(&mut self, tag: &str) {
        if !self.remove(tag) {
            self.insert(tag);
        }
    }

    /// Membership test; `tag` is normalized first.
    pub fn contains(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|tag| self.0.contains(&tag))
    }

    /// Membership test for an already-normalized tag.
    pub(crate) fn contains_normalized(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0.into_iter().collect()
    }
}
