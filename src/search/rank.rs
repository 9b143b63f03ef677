//! Ranked free-text search over a collection.

use super::scoring::score;
use crate::config::SearchSettings;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Deref;
use std::str::FromStr;

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Highest relevance first
    #[default]
    Relevance,
    /// Name, case-insensitive ascending
    Name,
    /// Most recently updated (or created) first; undated items last
    Recent,
}

impl FromStr for SortBy {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to relevance ordering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "name" | "alphabetical" => Self::Name,
            "recent" | "updated" | "updatedat" | "date" => Self::Recent,
            _ => Self::Relevance,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    /// Results scoring below this are dropped
    pub min_score: f64,
    /// Maximum number of results; 0 means unlimited
    pub max_results: usize,
    pub sort_by: SortBy,
}

impl Default for RankOptions {
    fn default() -> Self {
        SearchSettings::default().into()
    }
}

impl From<SearchSettings> for RankOptions {
    fn from(settings: SearchSettings) -> Self {
        Self {
            min_score: settings.min_score,
            max_results: settings.max_results,
            sort_by: SortBy::Relevance,
        }
    }
}

impl RankOptions {
    pub const fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub const fn limit(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// An item annotated with its relevance to a query.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedResult<'a> {
    #[serde(flatten)]
    pub item: &'a Item,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: f64,
}

impl Deref for RankedResult<'_> {
    type Target = Item;

    fn deref(&self) -> &Item {
        self.item
    }
}

fn compare(a: &RankedResult<'_>, b: &RankedResult<'_>, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Relevance => b.relevance_score.total_cmp(&a.relevance_score),
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        // `None < Some`, so comparing b to a puts undated items last
        SortBy::Recent => b.last_modified().cmp(&a.last_modified()),
    }
}

/// Score, filter, sort and truncate `items` for `query`.
///
/// Sorting is stable, so equal keys keep their input order. A blank query
/// yields no results.
pub fn rank<'a, I>(items: I, query: &str, options: &RankOptions) -> Vec<RankedResult<'a>>
where
    I: IntoIterator<Item = &'a Item>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut results: Vec<RankedResult<'a>> = items
        .into_iter()
        .map(|item| RankedResult {
            item,
            relevance_score: score(item, query),
        })
        .filter(|r| r.relevance_score > 0.0 && r.relevance_score >= options.min_score)
        .collect();

    results.sort_by(|a, b| compare(a, b, options.sort_by));

    if options.max_results > 0 {
        results.truncate(options.max_results);
    }

    tracing::debug!(
        "Ranked {} results for '{}' (sort: {:?})",
        results.len(),
        query,
        options.sort_by
    );
    results
}
