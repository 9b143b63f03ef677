//! Batched filtering for very large collections.
//!
//! The pipeline runs over contiguous batches and yields to the scheduler between
//! them, so other tasks (typically the next keystroke) get a chance to run. A run
//! can be cancelled at any batch boundary, and [`ProgressiveFilterRunner`] makes
//! sure only the most recently started run ever publishes a result.

use super::config::FilterConfig;
use super::pipeline::FilterPipeline;
use crate::item::{Item, ItemKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Collection size above which filtering goes progressive.
pub const DEFAULT_PROGRESSIVE_THRESHOLD: usize = 10_000;

/// Filter `items` in batches of `batch_size` (0 means [`DEFAULT_BATCH_SIZE`]).
///
/// Returns `None` if `cancel` fires before the last batch completes. Results keep
/// the input order.
pub async fn filter_progressive<'a>(
    pipeline: &FilterPipeline,
    items: &'a [Item],
    config: &FilterConfig,
    kind: ItemKind,
    batch_size: usize,
    cancel: &CancellationToken,
) -> Option<Vec<&'a Item>> {
    let batch_size = if batch_size == 0 {
        DEFAULT_BATCH_SIZE
    } else {
        batch_size
    };

    let start = Instant::now();
    let mut result = Vec::new();
    for (index, batch) in items.chunks(batch_size).enumerate() {
        if index > 0 {
            tokio::task::yield_now().await;
        }
        if cancel.is_cancelled() {
            tracing::debug!("Progressive filter cancelled after {} batches", index);
            return None;
        }
        result.extend(pipeline.apply_auto(batch, config, kind));
    }

    tracing::debug!(
        "Progressive filter over {} {} produced {} in {:?}",
        items.len(),
        kind.plural(),
        result.len(),
        start.elapsed()
    );
    Some(result)
}

/// Identifies one started run.
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    token: CancellationToken,
}

impl RunTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Last-write-wins coordination between overlapping progressive runs.
#[derive(Debug, Default)]
pub struct ProgressiveFilterRunner {
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

impl ProgressiveFilterRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Start a new run, cancelling whichever run was current.
    pub fn begin(&self) -> RunTicket {
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        *current = Some(token.clone());
        RunTicket { generation, token }
    }

    /// Whether `ticket` belongs to the latest run and has not been cancelled.
    pub fn is_current(&self, ticket: &RunTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation && !ticket.token.is_cancelled()
    }

    /// Cancel the current run, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    /// Run [`filter_progressive`] as the new current run.
    ///
    /// Returns `None` if a later run started (or [`Self::cancel`] was called)
    /// before this one finished.
    pub async fn run_latest<'a>(
        &self,
        pipeline: &FilterPipeline,
        items: &'a [Item],
        config: &FilterConfig,
        kind: ItemKind,
        batch_size: usize,
    ) -> Option<Vec<&'a Item>> {
        let ticket = self.begin();
        let result =
            filter_progressive(pipeline, items, config, kind, batch_size, ticket.token()).await?;
        self.is_current(&ticket).then_some(result)
    }
}
