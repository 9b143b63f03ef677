//! Bounded, persisted record of recent search queries.

use crate::storage::{SEARCH_HISTORY_KEY, SharedStore, load_json, save_json};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Default number of remembered queries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Recent search queries, most recent first.
///
/// Persistence is best-effort: a failed read starts from an empty history and a
/// failed write keeps the in-memory history, so nothing is ever thrown at the caller.
pub struct SearchHistory {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
    store: SharedStore,
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("entries", &self.lock().len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl SearchHistory {
    /// Load the history from `store`. A capacity of zero is treated as one.
    pub fn load(store: SharedStore, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let stored: Vec<String> = match load_json(store.as_ref(), SEARCH_HISTORY_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Starting with empty search history: {}", e);
                Vec::new()
            }
        };

        // Entries written by older versions (or by hand) may be blank or duplicated
        let mut entries = VecDeque::with_capacity(capacity);
        for term in stored {
            let term = term.trim();
            if !term.is_empty() && !entries.iter().any(|t| t == term) && entries.len() < capacity
            {
                entries.push_back(term.to_string());
            }
        }

        Self {
            entries: Mutex::new(entries),
            capacity,
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, entries: &VecDeque<String>) {
        if let Err(e) = save_json(self.store.as_ref(), SEARCH_HISTORY_KEY, entries) {
            tracing::warn!("Failed to persist search history: {}", e);
        }
    }

    /// Record a query. Blank queries are ignored and return false.
    ///
    /// A query already in the history moves to the front; the oldest entry is
    /// dropped once capacity is reached.
    pub fn add_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }

        let mut entries = self.lock();
        entries.retain(|t| t != term);
        entries.push_front(term.to_string());
        entries.truncate(self.capacity);
        self.persist(&entries);
        true
    }

    /// Recorded queries, most recent first.
    pub fn history(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        if let Err(e) = self.store.remove(SEARCH_HISTORY_KEY) {
            tracing::warn!("Failed to clear persisted search history: {}", e);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
