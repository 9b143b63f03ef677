//! Search, tag filtering and tag suggestions for a library of prompt templates,
//! workflows and snippets.

pub mod cache;
pub mod config;
pub mod debounce;
pub mod digest;
pub mod engine;
pub mod error;
pub mod filter;
pub mod item;
pub mod search;
pub mod storage;
pub mod tags;
pub mod tracing;

pub use config::EngineConfig;
pub use engine::SearchEngine;
pub use filter::{FilterConfig, FilterMode};
pub use item::{Item, ItemDetail, ItemKind};
pub use search::{RankOptions, RankedResult, SortBy};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use tags::{TagFrequency, TagSet};
