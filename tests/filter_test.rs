mod common;

use assert2::check;
use common::{generated_snippets, ids, library, scenario_snippets};
use promptkit_search::filter::{
    CategoryFilter, FilterConfig, FilterMode, FilterPipeline, TagFilterEngine, TypeFilter,
};
use promptkit_search::{Item, ItemKind, SearchEngine, TagSet};
use rstest::rstest;

fn tags(names: &[&str]) -> TagSet {
    names.iter().collect()
}

// --- Tag filter ---

#[rstest]
fn scenario_b_and_versus_or(scenario_snippets: Vec<Item>) {
    let engine = TagFilterEngine::default();
    let selected = tags(&["docs", "dev"]);

    let and = engine.filter_slice(&scenario_snippets, &selected, FilterMode::And, ItemKind::Snippet);
    check!(ids(&and) == ["2"]);

    let or = engine.filter_slice(&scenario_snippets, &selected, FilterMode::Or, ItemKind::Snippet);
    check!(ids(&or) == ["1", "2"]);
}

#[rstest]
#[case(&["docs"])]
#[case(&["rust", "cli"])]
#[case(&["web", "test", "missing"])]
fn and_results_are_subset_of_or_results(#[case] selected: &[&str]) {
    let items = generated_snippets(300);
    let engine = TagFilterEngine::default();
    let selected = tags(selected);

    let and = ids(&engine.filter_slice(&items, &selected, FilterMode::And, ItemKind::Snippet));
    let or = ids(&engine.filter_slice(&items, &selected, FilterMode::Or, ItemKind::Snippet));
    check!(and.iter().all(|id| or.contains(id)));
    check!(and.len() <= or.len());
}

#[rstest]
fn empty_selection_is_identity(library: Vec<Item>) {
    let engine = TagFilterEngine::default();
    for mode in [FilterMode::And, FilterMode::Or] {
        let result = engine.filter_slice(&library, &TagSet::new(), mode, ItemKind::Template);
        check!(result.len() == library.len());
        check!(result.iter().zip(&library).all(|(a, b)| std::ptr::eq(*a, b)));
    }
}

#[test]
fn cached_results_match_uncached_results() {
    let items = generated_snippets(500);
    let cached = TagFilterEngine::default();
    let selected = tags(&["rust", "docs"]);

    for mode in [FilterMode::And, FilterMode::Or] {
        let cold = ids(&cached.filter_slice(&items, &selected, mode, ItemKind::Snippet));
        let warm = ids(&cached.filter_slice(&items, &selected, mode, ItemKind::Snippet));

        let fresh = TagFilterEngine::default();
        let uncached = ids(&fresh.filter_slice(&items, &selected, mode, ItemKind::Snippet));
        check!(cold == uncached);
        check!(warm == uncached);
    }
    check!(cached.cache_len() == 2);
}

#[test]
fn tag_matching_ignores_case_and_whitespace() {
    let items = vec![Item::snippet("x", "x").with_tags([" Rust ", "CLI"])];
    let engine = TagFilterEngine::default();
    let result = engine.filter_slice(&items, &tags(&["rust", "cli"]), FilterMode::And, ItemKind::Snippet);
    check!(result.len() == 1);
}

// --- Pipeline ---

#[rstest]
fn pipeline_is_idempotent(library: Vec<Item>) {
    let pipeline = FilterPipeline::default();
    let config = FilterConfig {
        selected_tags: tags(&["code", "ops"]),
        filter_mode: FilterMode::Or,
        ..FilterConfig::default()
    };

    let once: Vec<Item> = pipeline
        .apply(&library, &config, ItemKind::Template)
        .into_iter()
        .cloned()
        .collect();
    let twice = pipeline.apply(&once, &config, ItemKind::Template);
    check!(ids(&twice) == ids(&once.iter().collect::<Vec<_>>()));
    check!(ids(&twice) == ["t1", "t3", "t4"]);
}

#[rstest]
fn type_mismatch_returns_nothing(library: Vec<Item>) {
    let pipeline = FilterPipeline::default();
    for kind in [ItemKind::Workflow, ItemKind::Snippet] {
        let config = FilterConfig {
            item_type: TypeFilter::Only(kind),
            ..FilterConfig::default()
        };
        check!(pipeline.apply(&library, &config, ItemKind::Template).is_empty());
        check!(pipeline.apply_optimized(&library, &config, ItemKind::Template).is_empty());
    }
}

#[rstest]
#[case(FilterConfig::default())]
#[case(FilterConfig { favorite_only: true, ..FilterConfig::default() })]
#[case(FilterConfig { has_content: true, ..FilterConfig::default() })]
#[case(FilterConfig { category: CategoryFilter::Named("tooling".into()), ..FilterConfig::default() })]
#[case(FilterConfig {
    selected_tags: ["rust", "web"].into_iter().collect(),
    filter_mode: FilterMode::Or,
    favorite_only: true,
    ..FilterConfig::default()
})]
#[case(FilterConfig {
    selected_tags: ["docs", "cli"].into_iter().collect(),
    has_content: true,
    category: CategoryFilter::Named("backend".into()),
    item_type: TypeFilter::Only(ItemKind::Snippet),
    ..FilterConfig::default()
})]
fn naive_and_optimized_pipelines_agree(#[case] config: FilterConfig) {
    let items = generated_snippets(1_000);
    let naive = FilterPipeline::default();
    let optimized = FilterPipeline::default();
    check!(
        ids(&naive.apply(&items, &config, ItemKind::Snippet))
            == ids(&optimized.apply_optimized(&items, &config, ItemKind::Snippet))
    );
}

#[test]
fn one_pipeline_serves_many_configs() {
    let items = generated_snippets(600);
    let selections = [tags(&["rust"]), tags(&["docs", "cli"])];
    let mut configs = Vec::new();
    for selected in &selections {
        for mode in [FilterMode::And, FilterMode::Or] {
            for (favorite_only, has_content) in [(false, false), (true, false), (false, true), (true, true)] {
                for category in [CategoryFilter::All, CategoryFilter::Named("tooling".into())] {
                    configs.push(FilterConfig {
                        selected_tags: selected.clone(),
                        filter_mode: mode,
                        favorite_only,
                        has_content,
                        category,
                        ..FilterConfig::default()
                    });
                }
            }
        }
    }

    let shared = FilterPipeline::default();
    // Two passes so the second one is served from the cache
    for _ in 0..2 {
        for config in &configs {
            let fresh = ids(&FilterPipeline::default().apply(&items, config, ItemKind::Snippet));
            check!(ids(&shared.apply(&items, config, ItemKind::Snippet)) == fresh);
            check!(ids(&shared.apply_optimized(&items, config, ItemKind::Snippet)) == fresh);
        }
    }
}

#[rstest]
fn engine_filters_with_updated_config(library: Vec<Item>) {
    let engine = SearchEngine::in_memory();
    engine.update_filter_config(|config| {
        config.category = CategoryFilter::parse("ops");
        config.favorite_only = true;
    });
    check!(ids(&engine.apply_filters(&library, ItemKind::Template)) == ["t4"]);

    engine.set_filter_config(FilterConfig::default());
    check!(engine.apply_filters(&library, ItemKind::Template).len() == library.len());
}
