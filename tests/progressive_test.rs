mod common;

use assert2::{check, let_assert};
use common::{generated_snippets, ids};
use promptkit_search::filter::{
    FilterConfig, FilterMode, FilterPipeline, ProgressiveFilterRunner, filter_progressive,
};
use promptkit_search::{EngineConfig, ItemKind, MemoryStore, SearchEngine};
use tokio_util::sync::CancellationToken;

fn busy_config() -> FilterConfig {
    FilterConfig {
        selected_tags: ["rust", "cli"].into_iter().collect(),
        filter_mode: FilterMode::Or,
        has_content: true,
        ..FilterConfig::default()
    }
}

#[tokio::test]
async fn scenario_e_batched_result_matches_single_pass() {
    let items = generated_snippets(20_000);
    let config = busy_config();

    let single = FilterPipeline::default();
    let expected = ids(&single.apply(&items, &config, ItemKind::Snippet));
    check!(!expected.is_empty());

    let batched = FilterPipeline::default();
    let token = CancellationToken::new();
    let_assert!(
        Some(result) =
            filter_progressive(&batched, &items, &config, ItemKind::Snippet, 1000, &token).await
    );
    check!(ids(&result) == expected);
}

#[tokio::test]
async fn cancellation_mid_run_returns_none() {
    let items = generated_snippets(5_000);
    let pipeline = FilterPipeline::default();
    let token = CancellationToken::new();
    let config = busy_config();

    let canceller = token.clone();
    let (result, ()) = tokio::join!(
        filter_progressive(&pipeline, &items, &config, ItemKind::Snippet, 500, &token),
        async move {
            tokio::task::yield_now().await;
            canceller.cancel();
        }
    );
    check!(result.is_none());
}

#[tokio::test]
async fn newer_run_supersedes_older_run() {
    let items = generated_snippets(3_000);
    let pipeline = FilterPipeline::default();
    let runner = ProgressiveFilterRunner::new();
    let all = FilterConfig::default();
    let narrow = busy_config();

    let (older, newer) = tokio::join!(
        runner.run_latest(&pipeline, &items, &all, ItemKind::Snippet, 250),
        runner.run_latest(&pipeline, &items, &narrow, ItemKind::Snippet, 250),
    );
    check!(older.is_none());
    let_assert!(Some(newer) = newer);
    check!(ids(&newer) == ids(&pipeline.apply(&items, &narrow, ItemKind::Snippet)));
}

#[tokio::test]
async fn engine_goes_progressive_above_threshold() {
    let mut settings = EngineConfig::default();
    settings.filter.progressive_threshold = 1_000;
    settings.filter.batch_size = 100;
    let engine = SearchEngine::new(settings, MemoryStore::shared());
    engine.set_filter_config(busy_config());

    let items = generated_snippets(2_500);
    let direct = ids(&engine.apply_filters(&items, ItemKind::Snippet));
    let_assert!(Some(progressive) = engine.apply_filters_progressive(&items, ItemKind::Snippet).await);
    check!(ids(&progressive) == direct);
}
