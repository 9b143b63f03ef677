//! Shared test fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `library`: a small mixed template collection with tags, favorites and categories
//! - `scenario_snippets`: the two-snippet README collection used by ranking and tag tests
//! - `temp_store`: a [`FileStore`] rooted in a fresh temporary directory
//!
//! Large generated collections come from [`generated_snippets`].

#![allow(dead_code)] // Each integration test crate uses a different subset

use promptkit_search::{FileStore, Item, SharedStore};
use rstest::fixture;
use std::sync::Arc;
use tempfile::TempDir;

/// A file-backed store whose directory lives as long as this value.
pub struct TempStore {
    temp: TempDir,
    pub store: SharedStore,
}

impl TempStore {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp.path().join("store")).expect("Failed to open file store");
        Self {
            temp,
            store: Arc::new(store),
        }
    }

    /// Path of the directory holding the store's files.
    pub fn dir(&self) -> std::path::PathBuf {
        self.temp.path().join("store")
    }
}

#[fixture]
pub fn temp_store() -> TempStore {
    TempStore::new()
}

#[fixture]
pub fn scenario_snippets() -> Vec<Item> {
    vec![
        Item::snippet("1", "Generate README").with_tags(["docs"]),
        Item::snippet("2", "Readme helper").with_tags(["docs", "dev"]),
    ]
}

#[fixture]
pub fn library() -> Vec<Item> {
    vec![
        Item::template("t1", "Code review")
            .with_description("Ask for a careful review of a diff")
            .with_content("Review the following change: {{diff}}")
            .with_category("engineering")
            .with_variables(["diff"])
            .with_tags(["review", "code"])
            .with_favorite(true)
            .with_updated_at(3_000),
        Item::template("t2", "Release notes")
            .with_description("Summarize merged pull requests")
            .with_category("writing")
            .with_tags(["docs", "release"])
            .with_updated_at(1_000),
        Item::template("t3", "Deploy")
            .with_content("Deploy {{service}} to {{env}}")
            .with_category("ops")
            .with_variables(["service", "env"])
            .with_tags(["ops", "Code"]),
        Item::template("t4", "Deploy checklist")
            .with_description("Steps before deploying to production")
            .with_category("ops")
            .with_tags(["ops"])
            .with_favorite(true)
            .with_created_at(2_000),
        Item::template("t5", "Blank draft"),
    ]
}

/// `count` snippets cycling through a handful of tags, categories and flags.
pub fn generated_snippets(count: usize) -> Vec<Item> {
    const TAGS: [&str; 5] = ["rust", "docs", "cli", "web", "test"];
    const CATEGORIES: [&str; 3] = ["backend", "frontend", "tooling"];
    (0..count)
        .map(|i| {
            let mut snippet = Item::snippet(format!("s{i}"), format!("Snippet {i}"))
                .with_category(CATEGORIES[i % CATEGORIES.len()])
                .with_tags([TAGS[i % TAGS.len()], TAGS[(i / 7) % TAGS.len()]])
                .with_favorite(i % 3 == 0);
            if i % 4 != 0 {
                snippet = snippet.with_content(format!("fn snippet_{i}() {{}}"));
            }
            snippet
        })
        .collect()
}

pub fn ids(items: &[&Item]) -> Vec<String> {
    items.iter().map(|item| item.id.clone()).collect()
}
