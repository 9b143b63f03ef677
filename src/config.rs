//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all) yields
//! the stock behaviour. Unknown keys are ignored.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchSettings,
    pub filter: FilterSettings,
    pub suggestions: SuggestionSettings,
    pub history: HistorySettings,
    pub analytics: AnalyticsSettings,
}

/// Ranked free-text search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results scoring below this are dropped
    pub min_score: f64,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            max_results: 50,
        }
    }
}

/// Filter pipeline and tag-filter cache.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub cache_capacity: usize,
    /// Collections at least this large use the fused pipeline
    pub optimized_threshold: usize,
    /// Collections larger than this are filtered progressively when enabled
    pub progressive_threshold: usize,
    pub batch_size: usize,
    pub progressive: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            cache_capacity: crate::cache::DEFAULT_CACHE_CAPACITY,
            optimized_threshold: crate::filter::pipeline::DEFAULT_OPTIMIZED_THRESHOLD,
            progressive_threshold: crate::filter::progressive::DEFAULT_PROGRESSIVE_THRESHOLD,
            batch_size: crate::filter::progressive::DEFAULT_BATCH_SIZE,
            progressive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    pub max_terms: usize,
    pub max_tags: usize,
    pub debounce_ms: u64,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            max_terms: 8,
            max_tags: 10,
            debounce_ms: 250,
        }
    }
}

impl SuggestionSettings {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// How long a persisted tag-frequency result stays reusable
    pub ttl_secs: u64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl AnalyticsSettings {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse engine configuration")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }
}
