//! Search relevance scoring and match highlighting.
//!
//! Each searchable field is matched against the query on its own, the result is
//! weighted by the field's role, and the weighted scores are folded into a single
//! relevance value in `[0, 1]`.

use crate::item::{FieldRole, Item};

/// Exact (whole field) match.
const EXACT_SCORE: f64 = 1.0;
/// Field starts with the query.
const PREFIX_SCORE: f64 = 0.9;
/// Field contains the query.
const CONTAINS_SCORE: f64 = 0.7;
/// Lowest score of a successful subsequence match.
const FUZZY_FLOOR: f64 = 0.3;

/// Share of the best field in the combined score; the rest goes to the mean.
const BEST_FIELD_SHARE: f64 = 0.7;
const MEAN_SHARE: f64 = 0.3;

/// Calculate how well one field matches the query.
///
/// Returns, case-insensitively:
/// - 1.0: whole field equals the query
/// - 0.9: field starts with the query
/// - 0.7: field contains the query
/// - `max(0.3, query_len / field_len)`: query chars appear in order in the field
/// - 0.0: no match, or an empty query
pub fn field_match_score(field: &str, query: &str) -> f64 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0.0;
    }
    let field = field.trim().to_lowercase();

    if field == query {
        EXACT_SCORE
    } else if field.starts_with(&query) {
        PREFIX_SCORE
    } else if field.contains(&query) {
        CONTAINS_SCORE
    } else {
        subsequence_score(&field, &query)
    }
}

/// Greedy ordered character-subsequence match.
fn subsequence_score(field: &str, query: &str) -> f64 {
    let mut pending = query.chars().peekable();
    let mut field_len = 0usize;

    for c in field.chars() {
        field_len += 1;
        if pending.peek() == Some(&c) {
            pending.next();
        }
    }

    if pending.peek().is_some() || field_len == 0 {
        return 0.0;
    }

    let query_len = query.chars().count();
    (query_len as f64 / field_len as f64).max(FUZZY_FLOOR)
}

/// Relevance of an item for a query, in `[0, 1]`.
///
/// Fields are extracted according to the item's kind. The combined score is
/// `0.7 * best + 0.3 * mean` over the weighted scores of matching fields,
/// divided by the largest role weight. Items without any matching field score 0.
///
/// A name equal to the query scores 1.0 regardless of other fields. Only such
/// items can reach 1.0, since any other best field stays below the name weight.
pub fn score(item: &Item, query: &str) -> f64 {
    if query.trim().is_empty() {
        return 0.0;
    }

    let mut best = 0.0f64;
    let mut sum = 0.0f64;
    let mut matched = 0usize;

    for field in item.searchable_fields() {
        let raw = field_match_score(&field.text, query);
        if field.role == FieldRole::Name && raw >= EXACT_SCORE {
            return 1.0;
        }
        if raw > 0.0 {
            let weighted = raw * field.role.weight();
            best = best.max(weighted);
            sum += weighted;
            matched += 1;
        }
    }

    if matched == 0 {
        return 0.0;
    }

    let combined = BEST_FIELD_SHARE.mul_add(best, MEAN_SHARE * (sum / matched as f64));
    (combined / FieldRole::MAX_WEIGHT).min(1.0)
}

/// A text split around the first occurrence of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Split `text` around the first case-insensitive occurrence of `query`.
///
/// Only contiguous matches are highlighted; a field that matched through the
/// subsequence rule yields `None`.
pub fn highlight<'a>(text: &'a str, query: &str) -> Option<Highlight<'a>> {
    let needle: Vec<char> = query.trim().chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    text.char_indices().find_map(|(start, _)| {
        match_end(text, start, &needle).map(|end| Highlight {
            before: &text[..start],
            matched: &text[start..end],
            after: &text[end..],
        })
    })
}

/// Byte offset where `needle` ends if it matches `text` at `start`.
fn match_end(text: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, c) in text[start..].char_indices() {
        for lower in c.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(start + offset + c.len_utf8());
        }
    }
    None
}
