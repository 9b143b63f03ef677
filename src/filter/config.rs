//! Filter configuration and its sanitization.
//!
//! A [`FilterConfig`] is built from persisted preferences and then mutated by the
//! UI. Whatever arrives (hand-edited JSON, older preference formats, wrong types)
//! is normalized field by field to a safe default instead of being rejected.

use crate::item::ItemKind;
use crate::storage::{FILTER_PREFERENCES_KEY, KeyValueStore, load_json, save_json};
use crate::tags::TagSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Tag-filter semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Items must carry every selected tag
    #[default]
    And,
    /// Items must carry at least one selected tag
    Or,
}

impl FilterMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Parse `AND`/`OR` case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restriction on item kind. Serialized as `all` or a plural kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ItemKind),
}

impl TypeFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            Some(Self::All)
        } else {
            value.parse().ok().map(Self::Only)
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(kind) => kind.plural(),
        }
    }
}

/// Restriction on item category. Serialized as `all` or the category name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// `all` (any case) and blank names mean no restriction.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }

    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => category == Some(name.as_str()),
        }
    }
}

/// Everything the UI lets the user filter by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub selected_tags: TagSet,
    pub filter_mode: FilterMode,
    pub category: CategoryFilter,
    pub favorite_only: bool,
    pub has_content: bool,
    pub item_type: TypeFilter,
}

fn bool_field(object: &serde_json::Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            tracing::debug!("Ignoring non-boolean filter flag {}={}", key, other);
            false
        }
    }
}

impl FilterConfig {
    /// Build a configuration from arbitrary JSON, replacing every invalid field
    /// with its default.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                tracing::debug!("Filter configuration is not an object, using defaults");
            }
            return Self::default();
        };

        let selected_tags = match object.get("selectedTags") {
            Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).collect(),
            None | Some(Value::Null) => TagSet::new(),
            Some(other) => {
                tracing::debug!("Ignoring non-array selectedTags: {}", other);
                TagSet::new()
            }
        };

        let filter_mode = object
            .get("filterMode")
            .and_then(Value::as_str)
            .and_then(FilterMode::parse)
            .unwrap_or_default();

        let category = object
            .get("category")
            .and_then(Value::as_str)
            .map(CategoryFilter::parse)
            .unwrap_or_default();

        let item_type = object
            .get("type")
            .and_then(Value::as_str)
            .and_then(TypeFilter::parse)
            .unwrap_or_default();

        Self {
            selected_tags,
            filter_mode,
            category,
            favorite_only: bool_field(object, "favoriteOnly"),
            has_content: bool_field(object, "hasContent"),
            item_type,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "selectedTags": Vec::<String>::from(self.selected_tags.clone()),
            "filterMode": self.filter_mode.as_str(),
            "category": self.category.as_str(),
            "favoriteOnly": self.favorite_only,
            "hasContent": self.has_content,
            "type": self.item_type.as_str(),
        })
    }

    /// Whether any filter is active.
    pub fn is_active(&self) -> bool {
        !self.selected_tags.is_empty()
            || self.category != CategoryFilter::All
            || self.favorite_only
            || self.has_content
            || self.item_type != TypeFilter::All
    }

    /// Load saved preferences, falling back to defaults if absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Self>(store, FILTER_PREFERENCES_KEY) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable filter preferences: {}", e);
                Self::default()
            }
        }
    }

    /// Save as preferences. Failures are logged.
    pub fn save(&self, store: &dyn KeyValueStore) {
        if let Err(e) = save_json(store, FILTER_PREFERENCES_KEY, self) {
            tracing::warn!("Failed to save filter preferences: {}", e);
        }
    }
}

impl Serialize for FilterConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterConfig {
    /// Never fails on well-formed JSON: invalid fields become defaults.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use assert2::check;
    use serde_json::json;

    #[test]
    fn test_full_config() {
        let config = FilterConfig::from_value(&json!({
            "selectedTags": ["Docs", "dev"],
            "filterMode": "or",
            "category": "Writing",
            "favoriteOnly": true,
            "hasContent": false,
            "type": "templates",
        }));
        check!(config.selected_tags.iter().collect::<Vec<_>>() == ["dev", "docs"]);
        check!(config.filter_mode == FilterMode::Or);
        check!(config.category == CategoryFilter::Named("Writing".into()));
        check!(config.favorite_only);
        check!(config.item_type == TypeFilter::Only(ItemKind::Template));
    }

    #[test]
    fn test_invalid_values_normalized() {
        let config = FilterConfig::from_value(&json!({
            "selectedTags": "docs",
            "filterMode": "XOR",
            "category": 7,
            "favoriteOnly": "yes",
            "hasContent": 1,
            "type": "folders",
        }));
        check!(config == FilterConfig::default());
    }

    #[test]
    fn test_non_string_tags_skipped() {
        let config = FilterConfig::from_value(&json!({"selectedTags": ["a", 3, null, " "]}));
        check!(config.selected_tags.iter().collect::<Vec<_>>() == ["a"]);
    }

    #[test]
    fn test_non_object_is_default() {
        check!(FilterConfig::from_value(&json!([1, 2])) == FilterConfig::default());
        check!(FilterConfig::from_value(&Value::Null) == FilterConfig::default());
    }

    #[test]
    fn test_category_all_variants() {
        check!(CategoryFilter::parse("ALL") == CategoryFilter::All);
        check!(CategoryFilter::parse("  ") == CategoryFilter::All);
        check!(CategoryFilter::parse("ops").matches(Some("ops")));
        check!(!CategoryFilter::parse("ops").matches(Some("Ops")));
        check!(!CategoryFilter::parse("ops").matches(None));
    }

    #[test]
    fn test_serde_round_trip_through_value() {
        let mut config = FilterConfig {
            filter_mode: FilterMode::Or,
            has_content: true,
            item_type: TypeFilter::Only(ItemKind::Snippet),
            ..FilterConfig::default()
        };
        config.selected_tags.insert("rust");
        let json = serde_json::to_string(&config).unwrap();
        let back: FilterConfig = serde_json::from_str(&json).unwrap();
        check!(back == config);
        check!(back.is_active());
    }

    #[test]
    fn test_preferences_persistence() {
        let store = MemoryStore::new();
        check!(FilterConfig::load(&store) == FilterConfig::default());

        let config = FilterConfig {
            favorite_only: true,
            ..FilterConfig::default()
        };
        config.save(&store);
        check!(FilterConfig::load(&store) == config);

        store.set(FILTER_PREFERENCES_KEY, "{{{").unwrap();
        check!(FilterConfig::load(&store) == FilterConfig::default());
    }
}
