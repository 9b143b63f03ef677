//! Error handling types and utilities.

/// A specialized Result type for promptkit-search setup operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods (configuration loading, store construction).
pub type Result<T> = anyhow::Result<T>;

/// Error returned by a key/value store.
///
/// Never escapes the engine's public search/filter operations: every caller logs
/// it at warn level and degrades to recomputed or empty state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// A stored value could not be decoded (or a value could not be encoded).
    #[error("stored value for key '{key}' is corrupted: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The store refuses all access (quota exceeded, disabled storage, etc.).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
