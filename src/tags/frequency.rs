//! Tag usage analytics with a digest-guarded persisted cache.

use super::normalize_tag;
use crate::digest::{Digest, DigestBuilder};
use crate::item::Item;
use crate::storage::{SharedStore, TAG_ANALYTICS_KEY, load_json, save_json};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How often a tag is used across a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFrequency {
    /// Normalized (trimmed, lowercase) tag
    pub tag: String,
    /// Number of items carrying the tag
    pub count: usize,
    /// `round(100 * count / collection size)`, in `[0, 100]`
    pub percentage: u8,
}

/// Persisted form of a frequency analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedAnalytics {
    data: Vec<TagFrequency>,
    /// Milliseconds since the Unix epoch when `data` was computed
    timestamp: i64,
    #[serde(rename = "snippetHash")]
    hash: Digest,
}

fn percentage(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Integer round-half-up of 100 * count / total
    let rounded = (200 * count + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Count tag usage across `items`, most used first.
///
/// Tags are normalized and each item counts a tag at most once. Ties are ordered
/// alphabetically.
pub fn analyze(items: &[Item]) -> Vec<TagFrequency> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    for item in items {
        seen.clear();
        for tag in item.tags().iter().filter_map(|t| normalize_tag(t)) {
            if seen.insert(tag.clone()) {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
    }

    let mut frequencies: Vec<TagFrequency> = counts
        .into_iter()
        .map(|(tag, count)| TagFrequency {
            tag,
            count,
            percentage: percentage(count, items.len()),
        })
        .collect();

    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    frequencies
}

/// Digest over `(id, updatedAt, tags)` of every item, in order.
pub fn collection_digest(items: &[Item]) -> Digest {
    let mut builder = DigestBuilder::new();
    builder.u64(items.len() as u64);
    for item in items {
        builder.str(&item.id).opt_i64(item.updated_at);
        builder.u64(item.tags().len() as u64);
        for tag in item.tags() {
            builder.str(tag);
        }
    }
    builder.finish()
}

/// Merge the tag vocabularies of several collections into one sorted, de-duplicated
/// list for filter UIs.
pub fn extract_all_tags<'a, I>(collections: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [Item]>,
{
    let mut vocabulary = BTreeSet::new();
    for items in collections {
        vocabulary.extend(analyze(items).into_iter().map(|f| f.tag));
    }
    vocabulary.into_iter().collect()
}

/// Summary numbers shown next to tag filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagStatistics {
    pub total_items: usize,
    pub tagged_items: usize,
    pub distinct_tags: usize,
    pub average_tags_per_item: f64,
}

pub fn tag_statistics(items: &[Item]) -> TagStatistics {
    let mut distinct = AHashSet::new();
    let mut tagged_items = 0;
    let mut tag_total = 0usize;

    for item in items {
        let tags: AHashSet<String> = item.tags().iter().filter_map(|t| normalize_tag(t)).collect();
        if !tags.is_empty() {
            tagged_items += 1;
        }
        tag_total += tags.len();
        distinct.extend(tags);
    }

    TagStatistics {
        total_items: items.len(),
        tagged_items,
        distinct_tags: distinct.len(),
        average_tags_per_item: if items.is_empty() {
            0.0
        } else {
            tag_total as f64 / items.len() as f64
        },
    }
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Frequency analysis reused across calls while the collection is unchanged.
///
/// The result is persisted under [`TAG_ANALYTICS_KEY`] together with the time it
/// was computed and the collection digest. It is reused only while it is younger
/// than the TTL and the digest still matches. Storage failures are logged and the
/// analysis is recomputed.
pub struct TagFrequencyAnalyzer {
    store: SharedStore,
    ttl: Duration,
}

impl std::fmt::Debug for TagFrequencyAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagFrequencyAnalyzer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TagFrequencyAnalyzer {
    pub fn new(store: SharedStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Frequency analysis of `items`, served from the persisted cache when fresh.
    pub fn frequency(&self, items: &[Item]) -> Vec<TagFrequency> {
        self.frequency_at(items, now_millis())
    }

    /// [`Self::frequency`] with an explicit clock reading (ms since epoch).
    pub fn frequency_at(&self, items: &[Item], now: i64) -> Vec<TagFrequency> {
        let digest = collection_digest(items);

        if let Some(cached) = self.load_fresh(digest, now) {
            tracing::debug!("Tag analytics cache hit ({} tags)", cached.len());
            return cached;
        }

        let start = std::time::Instant::now();
        let data = analyze(items);
        tracing::debug!(
            "Computed tag analytics for {} items ({} tags) in {:?}",
            items.len(),
            data.len(),
            start.elapsed()
        );

        let record = CachedAnalytics {
            data,
            timestamp: now,
            hash: digest,
        };
        if let Err(e) = save_json(self.store.as_ref(), TAG_ANALYTICS_KEY, &record) {
            tracing::warn!("Failed to persist tag analytics: {}", e);
        }
        record.data
    }

    fn load_fresh(&self, digest: Digest, now: i64) -> Option<Vec<TagFrequency>> {
        let cached: CachedAnalytics = match load_json(self.store.as_ref(), TAG_ANALYTICS_KEY) {
            Ok(Some(cached)) => cached,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable tag analytics cache: {}", e);
                return None;
            }
        };

        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let age = now.saturating_sub(cached.timestamp);
        if cached.hash != digest {
            tracing::debug!("Tag analytics cache stale: collection changed");
            None
        } else if !(0..ttl_ms).contains(&age) {
            tracing::debug!("Tag analytics cache stale: age {}ms", age);
            None
        } else {
            Some(cached.data)
        }
    }

    /// Drop the persisted analysis so the next call recomputes.
    pub fn invalidate(&self) {
        if let Err(e) = self.store.remove(TAG_ANALYTICS_KEY) {
            tracing::warn!("Failed to clear tag analytics cache: {}", e);
        }
    }
}
