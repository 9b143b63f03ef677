//! Tag filtering with an LRU result cache.

use super::config::FilterMode;
use crate::cache::{BoundedCache, DEFAULT_CACHE_CAPACITY};
use crate::digest::{Digest, DigestBuilder};
use crate::item::{Item, ItemKind};
use crate::tags::TagSet;
use std::sync::Arc;

/// Whether `item` satisfies the tag selection under `mode`.
///
/// An empty selection matches everything.
pub fn matches_tags(item: &Item, selected: &TagSet, mode: FilterMode) -> bool {
    if selected.is_empty() {
        return true;
    }
    let item_tags: TagSet = item.tags().iter().collect();
    match mode {
        FilterMode::And => selected.iter().all(|tag| item_tags.contains_normalized(tag)),
        FilterMode::Or => selected.iter().any(|tag| item_tags.contains_normalized(tag)),
    }
}

fn key_builder(
    len: usize,
    first_id: Option<&str>,
    selected: &TagSet,
    mode: FilterMode,
    kind: ItemKind,
) -> DigestBuilder {
    let mut builder = DigestBuilder::new();
    builder
        .u64(len as u64)
        .str(first_id.unwrap_or(""))
        .u64(selected.len() as u64);
    for tag in selected.iter() {
        builder.str(tag);
    }
    builder.str(mode.as_str()).str(kind.as_str());
    builder
}

/// Cache key for a tag query over a collection.
///
/// The collection is identified only by its size and first item id, so an
/// in-place edit that keeps both unchanged is not detected.
pub fn cache_key(items: &[&Item], selected: &TagSet, mode: FilterMode, kind: ItemKind) -> Digest {
    let first = items.first().map(|item| item.id.as_str());
    let mut builder = key_builder(items.len(), first, selected, mode, kind);
    builder.u64(0);
    builder.finish()
}

/// Cache key for a tag query over the candidates a `scope` selected from
/// `collection`.
///
/// `scope` must identify everything that decided the candidates, so that two
/// queries over the same collection share an entry only when they share the
/// candidate set.
pub fn scoped_cache_key(
    collection: &[Item],
    scope: Digest,
    selected: &TagSet,
    mode: FilterMode,
    kind: ItemKind,
) -> Digest {
    let first = collection.first().map(|item| item.id.as_str());
    let mut builder = key_builder(collection.len(), first, selected, mode, kind);
    builder.u64(1).u64(scope.as_u64());
    builder.finish()
}

/// Tag filter whose results are memoized per (collection, selection, mode, kind).
///
/// Cached entries are positions into the filtered collection, so a hit returns
/// references into the caller's slice in their original order.
#[derive(Debug)]
pub struct TagFilterEngine {
    cache: BoundedCache<Digest, Arc<[usize]>>,
}

impl Default for TagFilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl TagFilterEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Items carrying the selected tags, in input order.
    ///
    /// With an empty selection the input is returned unchanged and nothing is cached.
    pub fn filter_by_tags<'a>(
        &self,
        items: &[&'a Item],
        selected: &TagSet,
        mode: FilterMode,
        kind: ItemKind,
    ) -> Vec<&'a Item> {
        if selected.is_empty() {
            return items.to_vec();
        }

        let key = cache_key(items, selected, mode, kind);
        if let Some(positions) = self.cache.get(&key) {
            tracing::debug!("Tag filter cache hit {} ({} results)", key, positions.len());
            return positions.iter().filter_map(|&i| items.get(i).copied()).collect();
        }

        let positions: Arc<[usize]> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_tags(item, selected, mode))
            .map(|(i, _)| i)
            .collect();
        tracing::debug!(
            "Tag filter cache miss {}: {} of {} items match",
            key,
            positions.len(),
            items.len()
        );

        let result = positions.iter().map(|&i| items[i]).collect();
        if let Some((evicted, _)) = self.cache.put(key, positions) {
            tracing::debug!("Evicted tag filter cache entry {}", evicted);
        }
        result
    }

    /// Tag filter over a subset of `collection`, given as ascending positions.
    ///
    /// Cached entries hold positions into `collection` and are keyed by
    /// [`scoped_cache_key`], so different candidate sets never share an entry
    /// as long as their scopes differ.
    pub fn filter_candidates<'a>(
        &self,
        collection: &'a [Item],
        candidates: &[usize],
        scope: Digest,
        selected: &TagSet,
        mode: FilterMode,
        kind: ItemKind,
    ) -> Vec<&'a Item> {
        if selected.is_empty() {
            return candidates.iter().filter_map(|&i| collection.get(i)).collect();
        }

        let key = scoped_cache_key(collection, scope, selected, mode, kind);
        if let Some(positions) = self.cache.get(&key) {
            tracing::debug!("Tag filter cache hit {} ({} results)", key, positions.len());
            return positions.iter().filter_map(|&i| collection.get(i)).collect();
        }

        let positions: Arc<[usize]> = candidates
            .iter()
            .copied()
            .filter(|&i| collection.get(i).is_some_and(|item| matches_tags(item, selected, mode)))
            .collect();
        tracing::debug!(
            "Tag filter cache miss {}: {} of {} candidates match",
            key,
            positions.len(),
            candidates.len()
        );

        let result = positions.iter().map(|&i| &collection[i]).collect();
        if let Some((evicted, _)) = self.cache.put(key, positions) {
            tracing::debug!("Evicted tag filter cache entry {}", evicted);
        }
        result
    }

    /// [`Self::filter_by_tags`] over an owned collection.
    pub fn filter_slice<'a>(
        &self,
        items: &'a [Item],
        selected: &TagSet,
        mode: FilterMode,
        kind: ItemKind,
    ) -> Vec<&'a Item> {
        let refs: Vec<&Item> = items.iter().collect();
        self.filter_by_tags(&refs, selected, mode, kind)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }
}
