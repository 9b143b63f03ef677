//! Autocomplete suggestions for the search box and the tag input.

use crate::config::SuggestionSettings;
use crate::debounce::Debouncer;
use crate::item::Item;
use crate::tags::{TagFrequency, TagSet, normalize_tag};
use ahash::AHashSet;
use rapidfuzz::distance::levenshtein;
use std::sync::Arc;
use tokio::sync::watch;

/// Partial queries shorter than this produce no term suggestions.
pub const MIN_SUGGESTION_CHARS: usize = 2;

const EXACT_TAG_SCORE: f64 = 100.0;
const PREFIX_TAG_SCORE: f64 = 80.0;
const SUBSTRING_TAG_SCORE: f64 = 60.0;
const FUZZY_TAG_SCORE: f64 = 40.0;

/// Completion terms for a partially typed query.
///
/// For each searchable field, words that start with `partial` (case-insensitive)
/// and are longer than it are collected, followed by the whole field when it starts
/// with `partial`. Terms are de-duplicated as entered and capped at `max`.
pub fn suggest_terms(items: &[Item], partial: &str, max: usize) -> Vec<String> {
    let partial = partial.trim();
    let partial_len = partial.chars().count();
    if partial_len < MIN_SUGGESTION_CHARS || max == 0 {
        return Vec::new();
    }
    let needle = partial.to_lowercase();

    let mut seen: AHashSet<String> = AHashSet::new();
    let mut suggestions = Vec::new();
    let mut push = |term: &str, suggestions: &mut Vec<String>| {
        if seen.insert(term.to_string()) {
            suggestions.push(term.to_string());
        }
    };

    for item in items {
        for field in item.searchable_fields() {
            for word in field.text.split_whitespace() {
                if word.chars().count() > partial_len && word.to_lowercase().starts_with(&needle) {
                    push(word, &mut suggestions);
                }
            }

            let whole = field.text.trim();
            if whole.to_lowercase().starts_with(&needle) {
                push(whole, &mut suggestions);
            }

            if suggestions.len() >= max {
                suggestions.truncate(max);
                return suggestions;
            }
        }
    }

    suggestions
}

/// Whether `query` matches some window of `tag` within the typo budget.
///
/// The budget is one edit per three query characters, so queries shorter than
/// three characters never match fuzzily.
fn fuzzy_tag_match(tag: &str, query: &str) -> bool {
    let query: Vec<char> = query.chars().collect();
    let budget = query.len() / 3;
    if budget == 0 {
        return false;
    }

    let tag: Vec<char> = tag.chars().collect();
    if tag.len() <= query.len() {
        return levenshtein::distance(query.iter().copied(), tag.iter().copied()) <= budget;
    }

    tag.windows(query.len())
        .any(|window| levenshtein::distance(query.iter().copied(), window.iter().copied()) <= budget)
}

/// Match tier of a normalized tag against a normalized query.
fn tag_match_score(tag: &str, query: &str) -> Option<f64> {
    if tag == query {
        Some(EXACT_TAG_SCORE)
    } else if tag.starts_with(query) {
        Some(PREFIX_TAG_SCORE)
    } else if tag.contains(query) {
        Some(SUBSTRING_TAG_SCORE)
    } else if fuzzy_tag_match(tag, query) {
        Some(FUZZY_TAG_SCORE)
    } else {
        None
    }
}

/// Rank tag-frequency records against the text in the tag input.
///
/// Tags in `exclude` (usually the already-selected ones) are skipped. Matches are
/// tiered exact > prefix > substring > fuzzy, and within a tier more frequently
/// used tags come first: the usage bonus (`percentage / 10`) never exceeds the gap
/// between tiers. An empty input returns the most used tags.
pub fn filter_tag_suggestions(
    records: &[TagFrequency],
    input: &str,
    max: usize,
    exclude: &TagSet,
) -> Vec<TagFrequency> {
    let available = records.iter().filter(|r| !exclude.contains(&r.tag));

    let Some(query) = normalize_tag(input) else {
        let mut top: Vec<TagFrequency> = available.cloned().collect();
        top.sort_by(|a, b| b.count.cmp(&a.count));
        top.truncate(max);
        return top;
    };

    let mut scored: Vec<(f64, &TagFrequency)> = available
        .filter_map(|record| {
            let tag = record.tag.to_lowercase();
            tag_match_score(&tag, &query)
                .map(|tier| (tier + f64::from(record.percentage) / 10.0, record))
        })
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored
        .into_iter()
        .take(max)
        .map(|(_, record)| record.clone())
        .collect()
}

/// Debounced suggestion producer for one UI session.
///
/// Requests are coalesced by a [`Debouncer`] per input; the latest results are
/// published on `watch` channels. After [`Self::shutdown`] (or drop) no pending
/// request will publish.
#[derive(Debug)]
pub struct SuggestionService {
    term_debouncer: Debouncer,
    tag_debouncer: Debouncer,
    terms: Arc<watch::Sender<Vec<String>>>,
    tags: Arc<watch::Sender<Vec<TagFrequency>>>,
    max_terms: usize,
    max_tags: usize,
}

impl SuggestionService {
    pub fn new(settings: &SuggestionSettings) -> Self {
        let (terms, _) = watch::channel(Vec::new());
        let (tags, _) = watch::channel(Vec::new());
        Self {
            term_debouncer: Debouncer::new(settings.debounce()),
            tag_debouncer: Debouncer::new(settings.debounce()),
            terms: Arc::new(terms),
            tags: Arc::new(tags),
            max_terms: settings.max_terms,
            max_tags: settings.max_tags,
        }
    }

    /// Subscribe to term suggestions.
    pub fn terms(&self) -> watch::Receiver<Vec<String>> {
        self.terms.subscribe()
    }

    /// Subscribe to tag suggestions.
    pub fn tags(&self) -> watch::Receiver<Vec<TagFrequency>> {
        self.tags.subscribe()
    }

    /// Request term suggestions for the search box text.
    pub fn request_terms(&self, items: Arc<[Item]>, partial: String) -> bool {
        let sender = Arc::clone(&self.terms);
        let max = self.max_terms;
        self.term_debouncer.schedule(move || {
            let suggestions = suggest_terms(&items, &partial, max);
            tracing::debug!("Publishing {} term suggestions for '{}'", suggestions.len(), partial);
            sender.send_replace(suggestions);
        })
    }

    /// Request tag suggestions for the tag input text.
    pub fn request_tags(&self, records: Arc<[TagFrequency]>, input: String, exclude: TagSet) -> bool {
        let sender = Arc::clone(&self.tags);
        let max = self.max_tags;
        self.tag_debouncer.schedule(move || {
            let suggestions = filter_tag_suggestions(&records, &input, max, &exclude);
            tracing::debug!("Publishing {} tag suggestions for '{}'", suggestions.len(), input);
            sender.send_replace(suggestions);
        })
    }

    /// Drop pending requests without closing the service.
    pub fn cancel(&self) {
        self.term_debouncer.cancel();
        self.tag_debouncer.cancel();
    }

    /// Tear down: pending requests are dropped and new ones refused.
    pub fn shutdown(&self) {
        self.term_debouncer.shutdown();
        self.tag_debouncer.shutdown();
    }
}
