//! Multi-criteria filtering: type, favorite, content, category, then tags.

use super::config::{CategoryFilter, FilterConfig, TypeFilter};
use super::tags::TagFilterEngine;
use crate::digest::{Digest, DigestBuilder};
use crate::item::{Item, ItemKind};
use std::time::Instant;

/// Collection size from which [`FilterPipeline::apply_auto`] uses the fused pass.
pub const DEFAULT_OPTIMIZED_THRESHOLD: usize = 100;

/// Result of the type stage.
enum TypeStage {
    /// The configured type names another collection: nothing can match
    Mismatch,
    Any,
    Only(ItemKind),
}

fn type_stage(config: &FilterConfig, kind: ItemKind) -> TypeStage {
    match config.item_type {
        TypeFilter::All => TypeStage::Any,
        TypeFilter::Only(wanted) if wanted != kind => TypeStage::Mismatch,
        TypeFilter::Only(wanted) => TypeStage::Only(wanted),
    }
}

/// Non-tag criteria of `config` for a single item.
fn passes_attributes(item: &Item, config: &FilterConfig, only: Option<ItemKind>) -> bool {
    only.is_none_or(|kind| item.kind() == kind)
        && (!config.favorite_only || item.favorite)
        && (!config.has_content || item.has_content())
        && config.category.matches(item.category.as_deref())
}

/// Digest of the non-tag criteria, which together decide the tag-stage candidates.
fn attribute_scope(config: &FilterConfig) -> Digest {
    DigestBuilder::new()
        .u64(u64::from(config.favorite_only))
        .u64(u64::from(config.has_content))
        .u64(u64::from(matches!(config.category, CategoryFilter::Named(_))))
        .str(config.category.as_str())
        .str(config.item_type.as_str())
        .finish()
}

/// Runs the non-tag stages, then hands the surviving positions to the tag engine.
///
/// The tag cache is keyed on the whole input collection plus a digest of the
/// non-tag criteria, so one pipeline can serve any sequence of configs.
#[derive(Debug)]
pub struct FilterPipeline {
    tags: TagFilterEngine,
    optimized_threshold: usize,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(TagFilterEngine::default(), DEFAULT_OPTIMIZED_THRESHOLD)
    }
}

impl FilterPipeline {
    pub const fn new(tags: TagFilterEngine, optimized_threshold: usize) -> Self {
        Self {
            tags,
            optimized_threshold,
        }
    }

    pub const fn tag_engine(&self) -> &TagFilterEngine {
        &self.tags
    }

    pub const fn optimized_threshold(&self) -> usize {
        self.optimized_threshold
    }

    /// Filter `items` (a collection of `kind` items) stage by stage.
    pub fn apply<'a>(&self, items: &'a [Item], config: &FilterConfig, kind: ItemKind) -> Vec<&'a Item> {
        let only = match type_stage(config, kind) {
            TypeStage::Mismatch => return Vec::new(),
            TypeStage::Any => None,
            TypeStage::Only(kind) => Some(kind),
        };

        let mut stage: Vec<usize> = (0..items.len())
            .filter(|&i| only.is_none_or(|kind| items[i].kind() == kind))
            .collect();
        if config.favorite_only {
            stage.retain(|&i| items[i].favorite);
        }
        if config.has_content {
            stage.retain(|&i| items[i].has_content());
        }
        stage.retain(|&i| config.category.matches(items[i].category.as_deref()));

        self.tags.filter_candidates(
            items,
            &stage,
            attribute_scope(config),
            &config.selected_tags,
            config.filter_mode,
            kind,
        )
    }

    /// Same result as [`Self::apply`], evaluating the non-tag criteria in one pass.
    pub fn apply_optimized<'a>(
        &self,
        items: &'a [Item],
        config: &FilterConfig,
        kind: ItemKind,
    ) -> Vec<&'a Item> {
        let only = match type_stage(config, kind) {
            TypeStage::Mismatch => return Vec::new(),
            TypeStage::Any => None,
            TypeStage::Only(kind) => Some(kind),
        };

        let start = Instant::now();
        let candidates: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| passes_attributes(item, config, only))
            .map(|(i, _)| i)
            .collect();
        let result = self.tags.filter_candidates(
            items,
            &candidates,
            attribute_scope(config),
            &config.selected_tags,
            config.filter_mode,
            kind,
        );
        tracing::debug!(
            "Filtered {} {} down to {} in {:?}",
            items.len(),
            kind.plural(),
            result.len(),
            start.elapsed()
        );
        result
    }

    /// Pick [`Self::apply_optimized`] for collections at or above the threshold.
    pub fn apply_auto<'a>(&self, items: &'a [Item], config: &FilterConfig, kind: ItemKind) -> Vec<&'a Item> {
        if items.len() >= self.optimized_threshold {
            self.apply_optimized(items, config, kind)
        } else {
            self.apply(items, config, kind)
        }
    }
}
