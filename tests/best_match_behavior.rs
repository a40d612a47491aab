//! Behavior-driven tests for best-match selection.
//!
//! These tests verify WHICH offer the selector picks when several
//! marketplaces answer, and that the pick does not depend on timing.

use std::sync::Arc;
use std::time::Duration;

use cartpick_core::{
    BestMatchSelector, CandidateFuture, CandidateProduct, Marketplace, MarketplaceSelection,
    ScalingContext, SearchRequest, SelectorConfig, SourceStatus, SourceStrategy, StrategyRegistry,
    StrategyRegistryBuilder,
};

struct FixedStrategy {
    marketplace: Marketplace,
    candidates: Vec<CandidateProduct>,
    delay: Duration,
}

impl FixedStrategy {
    fn new(marketplace: Marketplace, offers: &[(&str, &str, i64, i64)]) -> Self {
        let candidates = offers
            .iter()
            .map(|(id, name, price, capacity)| {
                CandidateProduct::new(marketplace, *id, *name, *price, *capacity)
                    .expect("valid candidate")
            })
            .collect();
        Self {
            marketplace,
            candidates,
            delay: Duration::ZERO,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SourceStrategy for FixedStrategy {
    fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    fn search<'a>(
        &'a self,
        _keyword: &'a str,
        _required_amount: f64,
        _low_sugar: bool,
    ) -> CandidateFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.candidates.clone()
        })
    }
}

fn selector(strategies: Vec<FixedStrategy>) -> BestMatchSelector {
    let strategies = strategies
        .into_iter()
        .map(|strategy| Arc::new(strategy) as Arc<dyn SourceStrategy>)
        .collect();
    let registry = StrategyRegistry::new(strategies).expect("unique marketplaces");
    BestMatchSelector::new(Arc::new(registry), SelectorConfig::default())
}

fn milk_strategies() -> Vec<FixedStrategy> {
    vec![
        FixedStrategy::new(
            Marketplace::Bmart,
            &[("bm-900", "[B마트 전용] 배민이지 우유 900ml", 2_690, 900)],
        ),
        FixedStrategy::new(
            Marketplace::Kurly,
            &[("ku-1000", "[서울우유] 나100% 우유 1L", 2_980, 1_000)],
        ),
    ]
}

// =============================================================================
// Unit price ranking
// =============================================================================

#[tokio::test]
async fn when_cheaper_sticker_has_higher_unit_price_larger_pack_wins() {
    // Given: B-mart sells 900ml for 2690 (2.989/ml), Kurly 1L for 2980 (2.98/ml)
    let selector = selector(milk_strategies());

    // When: Searching for 1L of milk everywhere
    let best = selector
        .find_best_match("우유", 1000.0, &MarketplaceSelection::All)
        .await
        .expect("valid request")
        .expect("both marketplaces answered");

    // Then: The lower unit price wins despite the higher sticker price
    assert_eq!(best.marketplace, Marketplace::Kurly);
    assert_eq!(best.product.price(), 2_980);
    assert!((best.unit_price - 2.98).abs() < 1e-9);
    assert_eq!(best.purchase_quantity, 1);
}

#[tokio::test]
async fn when_unit_prices_tie_capacity_nearest_the_requirement_wins() {
    // Given: Two offers at exactly 3 per gram, 500g and 1kg
    let selector = selector(vec![
        FixedStrategy::new(Marketplace::Coupang, &[("cp-1kg", "양파 1kg", 3_000, 1_000)]),
        FixedStrategy::new(Marketplace::Naver, &[("nv-500", "양파 500g", 1_500, 500)]),
    ]);

    // When: Only 450g are needed
    let best = selector
        .find_best_match("양파", 450.0, &MarketplaceSelection::All)
        .await
        .expect("valid request")
        .expect("match");

    // Then: The 500g pack is closer to the requirement
    assert_eq!(best.marketplace, Marketplace::Naver);
    assert_eq!(best.product.source_id(), "nv-500");
}

#[tokio::test]
async fn when_requirement_exceeds_one_pack_quantity_rounds_up() {
    // Given: A single 1L offer
    let selector = selector(vec![FixedStrategy::new(
        Marketplace::Kurly,
        &[("ku-1000", "우유 1L", 2_980, 1_000)],
    )]);

    // When: 2.5L are required
    let best = selector
        .find_best_match("우유", 2_500.0, &MarketplaceSelection::All)
        .await
        .expect("valid request")
        .expect("match");

    // Then: Three packs are needed
    assert_eq!(best.purchase_quantity, 3);
}

// =============================================================================
// Order independence
// =============================================================================

#[tokio::test]
async fn winner_does_not_depend_on_which_marketplace_answers_first() {
    let offers = |bmart_delay: u64, kurly_delay: u64| {
        let mut strategies = milk_strategies();
        strategies[0].delay = Duration::from_millis(bmart_delay);
        strategies[1].delay = Duration::from_millis(kurly_delay);
        strategies
    };

    // Given: The same offers arriving in opposite orders
    let bmart_first = selector(offers(0, 40));
    let kurly_first = selector(offers(40, 0));

    // When: Both run the same search
    let left = bmart_first
        .find_best_match("우유", 1000.0, &MarketplaceSelection::All)
        .await
        .expect("valid request");
    let right = kurly_first
        .find_best_match("우유", 1000.0, &MarketplaceSelection::All)
        .await
        .expect("valid request");

    // Then: They agree on the winner
    assert_eq!(left, right);
}

#[tokio::test]
async fn exact_ties_resolve_the_same_way_every_time() {
    // Given: Identical offers on two marketplaces
    let strategies = || {
        vec![
            FixedStrategy::new(Marketplace::Naver, &[("same", "두부 300g", 1_500, 300)])
                .delayed(Duration::from_millis(5)),
            FixedStrategy::new(Marketplace::Coupang, &[("same", "두부 300g", 1_500, 300)]),
        ]
    };

    // When/Then: The lower marketplace id wins on every run
    for _ in 0..5 {
        let best = selector(strategies())
            .find_best_match("두부", 300.0, &MarketplaceSelection::All)
            .await
            .expect("valid request")
            .expect("match");
        assert_eq!(best.marketplace, Marketplace::Coupang);
    }
}

// =============================================================================
// Fan-out
// =============================================================================

#[tokio::test]
async fn slow_marketplace_does_not_hold_back_the_others() {
    // Given: Naver never answers within the search budget
    let mut strategies = milk_strategies();
    strategies.push(
        FixedStrategy::new(Marketplace::Naver, &[("nv", "우유 1L", 100, 1_000)])
            .delayed(Duration::from_secs(30)),
    );
    let registry = StrategyRegistry::new(
        strategies
            .into_iter()
            .map(|strategy| Arc::new(strategy) as Arc<dyn SourceStrategy>)
            .collect(),
    )
    .expect("unique marketplaces");
    let selector = BestMatchSelector::new(
        Arc::new(registry),
        SelectorConfig {
            search_timeout: Duration::from_millis(100),
        },
    );

    // When: Searching everywhere
    let request =
        SearchRequest::new("우유", 1000.0, MarketplaceSelection::All).expect("valid request");
    let outcome = selector.search(&request, std::future::pending::<()>()).await;

    // Then: The answering marketplaces still decide the result
    let best = outcome.best.expect("kurly and bmart answered");
    assert_eq!(best.marketplace, Marketplace::Kurly);
    let naver = outcome
        .sources
        .iter()
        .find(|report| report.marketplace == Marketplace::Naver)
        .expect("naver reported");
    assert_eq!(naver.status, SourceStatus::TimedOut);
    assert!(outcome.latency_ms < 30_000);
}

#[tokio::test]
async fn selection_limits_the_marketplaces_searched() {
    // Given: Kurly has the better offer
    let selector = selector(milk_strategies());
    let only_bmart = MarketplaceSelection::only([Marketplace::Bmart]).expect("non-empty");

    // When: Searching B-mart only
    let best = selector
        .find_best_match("우유", 1000.0, &only_bmart)
        .await
        .expect("valid request")
        .expect("match");

    // Then: Kurly is never consulted
    assert_eq!(best.marketplace, Marketplace::Bmart);
}

// =============================================================================
// Seeded catalogs
// =============================================================================

#[tokio::test]
async fn mock_registry_picks_lowest_unit_price_among_bmart_milks() {
    // Given: The seeded B-mart catalog
    let registry = StrategyRegistryBuilder::new().with_mock_mode().build();
    let selector = BestMatchSelector::new(Arc::new(registry), SelectorConfig::default());
    let only_bmart = MarketplaceSelection::only([Marketplace::Bmart]).expect("non-empty");

    // When: Searching for a liter of milk
    let best = selector
        .find_best_match("우유", 1000.0, &only_bmart)
        .await
        .expect("valid request")
        .expect("match");

    // Then: 2980/1000ml beats 2690/900ml and 2850/900ml
    assert_eq!(best.product.source_id(), "bm-milk-seoul-1l");
}

#[tokio::test]
async fn plan_scales_the_amount_before_searching() {
    // Given: A recipe for 2 asking for 600ml of milk
    let selector = selector(milk_strategies());
    let context = ScalingContext::new(2, 4).expect("positive portions");

    // When: Planning for 4 servings
    let plan = selector
        .plan("우유", 600.0, context, &MarketplaceSelection::All)
        .await
        .expect("valid plan");

    // Then: 1.2L is required and two 1L packs are bought
    assert_eq!(plan.required_amount, 1_200.0);
    let best = plan.best.expect("match");
    assert_eq!(best.marketplace, Marketplace::Kurly);
    assert_eq!(best.purchase_quantity, 2);
}
