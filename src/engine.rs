//! The engine facade the UI talks to.
//!
//! [`SearchEngine`] owns the current filter configuration and every cache and
//! persisted record, and exposes filtering, ranked search, tag analytics and
//! suggestions over caller-owned item collections.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::{FilterConfig, FilterPipeline, ProgressiveFilterRunner, TagFilterEngine};
use crate::item::{Item, ItemKind};
use crate::search::{RankOptions, RankedResult, SearchHistory, SuggestionService, rank};
use crate::storage::{FileStore, MemoryStore, SharedStore};
use crate::tags::{TagFrequency, TagFrequencyAnalyzer, TagStatistics};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct SearchEngine {
    settings: EngineConfig,
    store: SharedStore,
    config: RwLock<FilterConfig>,
    pipeline: FilterPipeline,
    analytics: TagFrequencyAnalyzer,
    history: SearchHistory,
    runner: ProgressiveFilterRunner,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &*self.read_config())
            .field("tag_cache_len", &self.pipeline.tag_engine().cache_len())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    /// Create an engine backed by `store`, restoring saved filter preferences and
    /// search history.
    pub fn new(settings: EngineConfig, store: SharedStore) -> Self {
        let config = FilterConfig::load(store.as_ref());
        let history = SearchHistory::load(Arc::clone(&store), settings.history.capacity);
        let pipeline = FilterPipeline::new(
            TagFilterEngine::new(settings.filter.cache_capacity),
            settings.filter.optimized_threshold,
        );
        let analytics = TagFrequencyAnalyzer::new(Arc::clone(&store), settings.analytics.ttl());

        tracing::debug!(
            "Search engine ready ({} history entries, filters active: {})",
            history.len(),
            config.is_active()
        );

        Self {
            settings,
            store,
            config: RwLock::new(config),
            pipeline,
            analytics,
            history,
            runner: ProgressiveFilterRunner::new(),
        }
    }

    /// Engine with default settings and nothing persisted beyond the process.
    pub fn in_memory() -> Self {
        Self::new(EngineConfig::default(), MemoryStore::shared())
    }

    /// Engine persisting to the per-user data directory.
    pub fn open_default(settings: EngineConfig) -> Result<Self> {
        let store = FileStore::open_default()?;
        Ok(Self::new(settings, Arc::new(store)))
    }

    pub const fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    pub const fn history(&self) -> &SearchHistory {
        &self.history
    }

    fn read_config(&self) -> RwLockReadGuard<'_, FilterConfig> {
        self.config
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, FilterConfig> {
        self.config
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // --- Filter configuration ---

    pub fn filter_config(&self) -> FilterConfig {
        self.read_config().clone()
    }

    pub fn set_filter_config(&self, config: FilterConfig) {
        *self.write_config() = config;
    }

    /// Modify the filter configuration in place, returning the updated value.
    pub fn update_filter_config<F>(&self, update: F) -> FilterConfig
    where
        F: FnOnce(&mut FilterConfig),
    {
        let mut config = self.write_config();
        update(&mut config);
        config.clone()
    }

    /// Persist the current filter configuration as the user's preferences.
    pub fn save_preferences(&self) {
        self.read_config().save(self.store.as_ref());
    }

    // --- Filtering ---

    /// Filter a collection of `kind` items with the current configuration.
    pub fn apply_filters<'a>(&self, items: &'a [Item], kind: ItemKind) -> Vec<&'a Item> {
        let config = self.filter_config();
        self.pipeline.apply_auto(items, &config, kind)
    }

    /// Like [`Self::apply_filters`], but large collections are filtered in batches
    /// without blocking the runtime.
    ///
    /// Every call supersedes the previous one; a superseded call returns `None`.
    pub async fn apply_filters_progressive<'a>(
        &self,
        items: &'a [Item],
        kind: ItemKind,
    ) -> Option<Vec<&'a Item>> {
        let config = self.filter_config();
        let filter = &self.settings.filter;
        if filter.progressive && items.len() > filter.progressive_threshold {
            self.runner
                .run_latest(&self.pipeline, items, &config, kind, filter.batch_size)
                .await
        } else {
            // Still supersedes any large run in flight
            self.runner.begin();
            Some(self.pipeline.apply_auto(items, &config, kind))
        }
    }

    // --- Search ---

    /// Ranking options from the configured search settings.
    pub fn rank_options(&self) -> RankOptions {
        self.settings.search.clone().into()
    }

    /// Ranked search over `items`. Non-blank terms are recorded in the history.
    pub fn perform_advanced_search<'a>(
        &self,
        items: &'a [Item],
        term: &str,
        options: &RankOptions,
    ) -> Vec<RankedResult<'a>> {
        self.history.add_search(term);
        rank(items, term, options)
    }

    /// Completions for the search box, limited by the configured maximum.
    pub fn suggest_terms(&self, items: &[Item], partial: &str) -> Vec<String> {
        crate::search::suggest_terms(items, partial, self.settings.suggestions.max_terms)
    }

    /// A debounced suggestion service using the configured delay and limits.
    pub fn suggestion_service(&self) -> SuggestionService {
        SuggestionService::new(&self.settings.suggestions)
    }

    // --- Tags ---

    /// Tag frequencies, reusing the persisted analysis while it is fresh.
    pub fn tag_frequency(&self, items: &[Item]) -> Vec<TagFrequency> {
        self.analytics.frequency(items)
    }

    pub fn tag_statistics(&self, items: &[Item]) -> TagStatistics {
        crate::tags::tag_statistics(items)
    }

    /// Tag completions, skipping tags already selected in the filter.
    pub fn filter_tag_suggestions(
        &self,
        records: &[TagFrequency],
        input: &str,
        max: usize,
    ) -> Vec<TagFrequency> {
        let config = self.read_config();
        crate::search::filter_tag_suggestions(records, input, max, &config.selected_tags)
    }

    /// Sorted tag vocabulary across collections.
    pub fn extract_all_tags<'a, I>(&self, collections: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a [Item]>,
    {
        crate::tags::extract_all_tags(collections)
    }

    /// Drop the tag-filter cache and the persisted tag analysis.
    pub fn clear_caches(&self) {
        self.pipeline.tag_engine().clear_cache();
        self.analytics.invalidate();
        tracing::debug!("Cleared search engine caches");
    }

    /// Entries currently held by the tag-filter cache.
    pub fn tag_cache_len(&self) -> usize {
        self.pipeline.tag_engine().cache_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterMode;
    use crate::storage::{FILTER_PREFERENCES_KEY, KeyValueStore, TAG_ANALYTICS_KEY};
    use assert2::{check, let_assert};

    fn library() -> Vec<Item> {
        vec![
            Item::template("t1", "Code review")
                .with_content("Review this diff")
                .with_tags(["review", "code"]),
            Item::template("t2", "Release notes").with_tags(["docs"]),
            Item::template("t3", "Commit message")
                .with_content("Summarize")
                .with_favorite(true)
                .with_tags(["code"]),
        ]
    }

    #[test]
    fn test_apply_filters_uses_current_config() {
        let engine = SearchEngine::in_memory();
        let items = library();
        check!(engine.apply_filters(&items, ItemKind::Template).len() == 3);

        engine.update_filter_config(|config| {
            config.selected_tags.insert("code");
            config.favorite_only = true;
        });
        let result = engine.apply_filters(&items, ItemKind::Template);
        check!(result.len() == 1);
        check!(result[0].id == "t3");
    }

    #[test]
    fn test_preferences_survive_restart() {
        let store = MemoryStore::shared();
        let engine = SearchEngine::new(EngineConfig::default(), Arc::clone(&store));
        engine.update_filter_config(|config| config.filter_mode = FilterMode::Or);
        engine.save_preferences();
        check!(store.get(FILTER_PREFERENCES_KEY).unwrap().is_some());

        let restarted = SearchEngine::new(EngineConfig::default(), store);
        check!(restarted.filter_config().filter_mode == FilterMode::Or);
    }

    #[test]
    fn test_search_records_history() {
        let engine = SearchEngine::in_memory();
        let items = library();
        let results = engine.perform_advanced_search(&items, "review", &engine.rank_options());
        let_assert!(Some(first) = results.first());
        check!(first.id == "t1");

        engine.perform_advanced_search(&items, "  ", &engine.rank_options());
        check!(engine.history().history() == ["review"]);
    }

    #[test]
    fn test_tag_suggestions_exclude_selected() {
        let engine = SearchEngine::in_memory();
        let items = library();
        let records = engine.tag_frequency(&items);
        engine.update_filter_config(|config| {
            config.selected_tags.insert("code");
        });
        let suggestions = engine.filter_tag_suggestions(&records, "", 10);
        check!(suggestions.iter().all(|s| s.tag != "code"));
        check!(suggestions.len() == 2);
    }

    #[test]
    fn test_clear_caches() {
        let store = MemoryStore::shared();
        let engine = SearchEngine::new(EngineConfig::default(), Arc::clone(&store));
        let items = library();
        engine.tag_frequency(&items);
        engine.update_filter_config(|config| {
            config.selected_tags.insert("docs");
        });
        engine.apply_filters(&items, ItemKind::Template);
        check!(engine.tag_cache_len() == 1);
        check!(store.get(TAG_ANALYTICS_KEY).unwrap().is_some());

        engine.clear_caches();
        check!(engine.tag_cache_len() == 0);
        check!(store.get(TAG_ANALYTICS_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_progressive_small_collection_runs_directly() {
        let engine = SearchEngine::in_memory();
        let items = library();
        let_assert!(Some(result) = engine.apply_filters_progressive(&items, ItemKind::Template).await);
        check!(result.len() == 3);
    }
}
