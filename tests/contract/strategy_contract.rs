//! Contract every registered source strategy must honor, checked against the
//! seeded mock registry.

use std::sync::Arc;

use cartpick_core::{
    is_relevant, Marketplace, SourceStrategy, StrategyRegistry, StrategyRegistryBuilder,
    MAX_CANDIDATES,
};

const KEYWORDS: [&str; 5] = ["우유", "양파", "소고기", "계란", "xyz123"];

fn mock_registry() -> StrategyRegistry {
    StrategyRegistryBuilder::new().with_mock_mode().build()
}

fn strategies(registry: &StrategyRegistry) -> Vec<Arc<dyn SourceStrategy>> {
    registry
        .marketplaces()
        .into_iter()
        .map(|marketplace| registry.resolve(marketplace).expect("registered"))
        .collect()
}

#[test]
fn mock_registry_covers_every_marketplace_once() {
    let registry = mock_registry();
    assert_eq!(registry.marketplaces(), Marketplace::ALL.to_vec());
    assert_eq!(registry.len(), Marketplace::ALL.len());
}

#[test]
fn resolve_returns_the_strategy_for_that_marketplace() {
    let registry = mock_registry();
    for marketplace in Marketplace::ALL {
        let strategy = registry.resolve(marketplace).expect("registered");
        assert_eq!(strategy.marketplace(), marketplace);
    }
}

#[tokio::test]
async fn every_candidate_is_tagged_with_the_strategy_marketplace() {
    let registry = mock_registry();
    for strategy in strategies(&registry) {
        for keyword in KEYWORDS {
            for candidate in strategy.search(keyword, 1_000.0, false).await {
                assert_eq!(
                    candidate.marketplace(),
                    strategy.marketplace(),
                    "keyword {keyword}"
                );
            }
        }
    }
}

#[tokio::test]
async fn results_are_bounded_and_relevant() {
    let registry = mock_registry();
    for strategy in strategies(&registry) {
        for keyword in KEYWORDS {
            let candidates = strategy.search(keyword, 1_000.0, false).await;
            assert!(candidates.len() <= MAX_CANDIDATES);
            for candidate in &candidates {
                assert!(
                    is_relevant(candidate.name(), keyword),
                    "{} returned irrelevant '{}' for '{keyword}'",
                    strategy.marketplace(),
                    candidate.name()
                );
                assert!(candidate.capacity_units() >= 1);
            }
        }
    }
}

#[tokio::test]
async fn results_are_ordered_by_price() {
    let registry = mock_registry();
    for strategy in strategies(&registry) {
        let candidates = strategy.search("우유", 1_000.0, false).await;
        let prices = candidates
            .iter()
            .map(|candidate| candidate.price())
            .collect::<Vec<_>>();
        let mut sorted = prices.clone();
        sorted.sort_unstable();
        assert_eq!(prices, sorted, "{}", strategy.marketplace());
    }
}

#[tokio::test]
async fn low_sugar_ordering_applies_only_with_nutrition_data() {
    let registry = mock_registry();

    let bmart = registry.resolve(Marketplace::Bmart).expect("registered");
    assert!(bmart.supports_nutrition());
    let by_sugar = bmart.search("우유", 1_000.0, true).await;
    let sugars = by_sugar
        .iter()
        .map(|candidate| candidate.sugar_per_100g().expect("seeded sugar"))
        .collect::<Vec<_>>();
    assert!(sugars.windows(2).all(|pair| pair[0] <= pair[1]));

    let kurly = registry.resolve(Marketplace::Kurly).expect("registered");
    assert!(!kurly.supports_nutrition());
    assert_eq!(
        kurly.search("우유", 1_000.0, true).await,
        kurly.search("우유", 1_000.0, false).await
    );
}

#[tokio::test]
async fn repeated_searches_are_identical() {
    let registry = mock_registry();
    for strategy in strategies(&registry) {
        for keyword in KEYWORDS {
            let first = strategy.search(keyword, 500.0, false).await;
            let second = strategy.search(keyword, 500.0, false).await;
            assert_eq!(first, second, "{} / {keyword}", strategy.marketplace());
        }
    }
}

#[test]
fn descriptors_list_each_chain() {
    let registry = mock_registry();
    let descriptors = registry.describe();

    assert_eq!(descriptors.len(), Marketplace::ALL.len());
    for descriptor in descriptors {
        assert_eq!(descriptor.sources.len(), 1);
        assert!(descriptor.sources[0].name.ends_with("-catalog"));
    }
}
