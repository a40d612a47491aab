//! Cross-marketplace best-match selection.
//!
//! The selector fans a search out to every requested marketplace at once,
//! folds the returned candidates into a running best, and returns whatever it
//! has when every source has answered, timed out, or the caller cancelled.
//!
//! Ranking is lexicographic:
//!
//! 1. unit price (`price / capacity_units`, compared exactly), lower wins;
//! 2. distance between `capacity_units` and the required amount, smaller wins;
//! 3. lower price, then marketplace id, then source id.
//!
//! The last step only exists to make the result independent of the order in
//! which sources answer.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::quantity::{purchase_quantity, ScalingContext};
use crate::registry::StrategyRegistry;
use crate::{CandidateProduct, CoreError, Marketplace, MarketplaceSelection, SearchRequest};

/// Selector-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Budget for one marketplace's whole strategy call.
    pub search_timeout: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(5),
        }
    }
}

/// The winning offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMatch {
    pub marketplace: Marketplace,
    pub product: CandidateProduct,
    pub unit_price: f64,
    /// Items to buy to cover the required amount; never below 1.
    pub purchase_quantity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Matched,
    Empty,
    Skipped,
    TimedOut,
    Cancelled,
}

impl SourceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Empty => "empty",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

/// What one marketplace contributed to a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub marketplace: Marketplace,
    pub status: SourceStatus,
    pub candidates: usize,
}

impl SourceReport {
    fn new(marketplace: Marketplace, status: SourceStatus, candidates: usize) -> Self {
        Self {
            marketplace,
            status,
            candidates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub best: Option<BestMatch>,
    pub sources: Vec<SourceReport>,
    /// True when the caller cancelled before every source answered.
    pub cancelled: bool,
    pub latency_ms: u64,
}

/// Scaled recipe ingredient paired with its best offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasePlan {
    pub ingredient: String,
    pub original_amount: f64,
    pub base_portion: i64,
    pub target_portion: i64,
    pub required_amount: f64,
    pub best: Option<BestMatch>,
}

/// Fans searches out across the registry and reduces them to one winner.
#[derive(Debug, Clone)]
pub struct BestMatchSelector {
    registry: Arc<StrategyRegistry>,
    config: SelectorConfig,
}

impl BestMatchSelector {
    pub fn new(registry: Arc<StrategyRegistry>, config: SelectorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn config(&self) -> SelectorConfig {
        self.config
    }

    /// Best offer for `keyword` across `targets`, or `None` when no
    /// marketplace returned a relevant candidate.
    ///
    /// # Errors
    ///
    /// Only configuration errors: a blank keyword or a negative / non-finite
    /// required amount. Source failures never surface here.
    pub async fn find_best_match(
        &self,
        keyword: &str,
        required_amount: f64,
        targets: &MarketplaceSelection,
    ) -> Result<Option<BestMatch>, CoreError> {
        let request = SearchRequest::new(keyword, required_amount, targets.clone())?;
        Ok(self.search(&request, std::future::pending::<()>()).await.best)
    }

    /// Runs a search that stops early when `cancel` completes. Partial
    /// results gathered up to that point are kept.
    pub async fn search<C>(&self, request: &SearchRequest, cancel: C) -> SearchOutcome
    where
        C: Future<Output = ()>,
    {
        let started = Instant::now();
        let required_amount = request.required_amount;
        let targets = request.targets.resolve(&self.registry.marketplaces());

        let mut reports = Vec::with_capacity(targets.len());
        let mut in_flight = BTreeSet::new();
        let mut pending = FuturesUnordered::new();
        for marketplace in targets {
            let strategy = match self.registry.resolve(marketplace) {
                Ok(strategy) => strategy,
                Err(error) => {
                    warn!(marketplace = %marketplace, error = %error, "skipping marketplace");
                    reports.push(SourceReport::new(marketplace, SourceStatus::Skipped, 0));
                    continue;
                }
            };

            in_flight.insert(marketplace);
            let keyword = request.keyword.clone();
            let budget = self.config.search_timeout;
            pending.push(async move {
                let result =
                    tokio::time::timeout(budget, strategy.search(&keyword, required_amount, false))
                        .await;
                (marketplace, result)
            });
        }

        let mut best: Option<CandidateProduct> = None;
        let mut cancelled = false;
        tokio::pin!(cancel);
        loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    cancelled = !in_flight.is_empty();
                    break;
                }
                next = pending.next() => {
                    let Some((marketplace, result)) = next else {
                        break;
                    };
                    in_flight.remove(&marketplace);

                    let Ok(candidates) = result else {
                        warn!(
                            marketplace = %marketplace,
                            timeout_ms = self.config.search_timeout.as_millis() as u64,
                            "marketplace search timed out"
                        );
                        reports.push(SourceReport::new(marketplace, SourceStatus::TimedOut, 0));
                        continue;
                    };

                    let count = fold_candidates(&mut best, marketplace, candidates, required_amount);
                    let status = if count == 0 { SourceStatus::Empty } else { SourceStatus::Matched };
                    debug!(marketplace = %marketplace, candidates = count, "marketplace answered");
                    reports.push(SourceReport::new(marketplace, status, count));
                }
            }
        }
        drop(pending);

        if cancelled {
            warn!(
                keyword = %request.keyword,
                abandoned = in_flight.len(),
                "search cancelled, returning partial result"
            );
        }
        for marketplace in in_flight {
            reports.push(SourceReport::new(marketplace, SourceStatus::Cancelled, 0));
        }
        reports.sort_by_key(|report| report.marketplace);

        let best = best.map(|product| into_best_match(product, required_amount));
        let latency_ms = started.elapsed().as_millis() as u64;
        info!(
            keyword = %request.keyword,
            required_amount,
            marketplaces = reports.len(),
            winner = best.as_ref().map(|best| best.marketplace.as_str()).unwrap_or("none"),
            latency_ms,
            "search finished"
        );

        SearchOutcome {
            best,
            sources: reports,
            cancelled,
            latency_ms,
        }
    }

    /// One marketplace's bounded candidate list, optionally ordered by sugar.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownMarketplace`] when `marketplace` has no strategy,
    /// or a validation error for a blank keyword / bad amount.
    pub async fn candidates(
        &self,
        marketplace: Marketplace,
        keyword: &str,
        required_amount: f64,
        low_sugar: bool,
    ) -> Result<Vec<CandidateProduct>, CoreError> {
        let request = SearchRequest::new(keyword, required_amount, MarketplaceSelection::All)?;
        let strategy = self.registry.resolve(marketplace)?;

        let search = strategy.search(&request.keyword, request.required_amount, low_sugar);
        match tokio::time::timeout(self.config.search_timeout, search).await {
            Ok(candidates) => Ok(candidates),
            Err(_) => {
                warn!(marketplace = %marketplace, "candidate search timed out");
                Ok(Vec::new())
            }
        }
    }

    /// Scales a recipe amount to the target portion, then finds its best offer.
    ///
    /// # Errors
    ///
    /// Propagates scaling and validation errors.
    pub async fn plan(
        &self,
        ingredient: &str,
        original_amount: f64,
        context: ScalingContext,
        targets: &MarketplaceSelection,
    ) -> Result<PurchasePlan, CoreError> {
        let required_amount = context.scale(original_amount)?;
        let best = self
            .find_best_match(ingredient, required_amount, targets)
            .await?;

        Ok(PurchasePlan {
            ingredient: ingredient.trim().to_owned(),
            original_amount,
            base_portion: context.base_portion(),
            target_portion: context.target_portion(),
            required_amount,
            best,
        })
    }
}

/// Total order used by the reduction; `Less` means `left` is the better offer.
pub fn compare_offers(left: &CandidateProduct, right: &CandidateProduct, required_amount: f64) -> Ordering {
    left.cmp_unit_price(right)
        .then_with(|| {
            left.capacity_distance(required_amount)
                .total_cmp(&right.capacity_distance(required_amount))
        })
        .then_with(|| left.price().cmp(&right.price()))
        .then_with(|| left.marketplace().cmp(&right.marketplace()))
        .then_with(|| left.source_id().cmp(right.source_id()))
}

fn fold_candidates(
    best: &mut Option<CandidateProduct>,
    marketplace: Marketplace,
    candidates: Vec<CandidateProduct>,
    required_amount: f64,
) -> usize {
    let mut count = 0;
    for candidate in candidates {
        if candidate.marketplace() != marketplace {
            warn!(
                marketplace = %marketplace,
                tagged = %candidate.marketplace(),
                "dropping candidate tagged with another marketplace"
            );
            continue;
        }
        count += 1;

        let improves = best
            .as_ref()
            .map_or(true, |current| compare_offers(&candidate, current, required_amount).is_lt());
        if improves {
            *best = Some(candidate);
        }
    }
    count
}

fn into_best_match(product: CandidateProduct, required_amount: f64) -> BestMatch {
    let quantity = purchase_quantity(required_amount, i64::from(product.capacity_units()))
        .unwrap_or(1)
        .max(1);
    BestMatch {
        marketplace: product.marketplace(),
        unit_price: product.unit_price(),
        purchase_quantity: quantity,
        product,
    }
}
