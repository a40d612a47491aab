//! Per-marketplace source strategies.
//!
//! A [`MarketStrategy`] walks an ordered chain of [`SourceAdapter`]s and returns
//! the first non-empty, relevance-filtered result. Every adapter failure or
//! timeout is logged and absorbed; a strategy never returns an error.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::data_source::{RawRecord, SourceAdapter};
use crate::normalize::to_candidate;
use crate::relevance::is_relevant;
use crate::{CandidateProduct, Marketplace};

/// Upper bound on candidates returned by one strategy call.
pub const MAX_CANDIDATES: usize = 5;

/// Default per-attempt deadline for one adapter call.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);

pub type CandidateFuture<'a> = Pin<Box<dyn Future<Output = Vec<CandidateProduct>> + Send + 'a>>;

/// Search capability of one marketplace.
pub trait SourceStrategy: Send + Sync {
    fn marketplace(&self) -> Marketplace;

    /// Whether the marketplace can report sugar content.
    fn supports_nutrition(&self) -> bool {
        false
    }

    /// Returns at most [`MAX_CANDIDATES`] relevant candidates, all tagged with
    /// [`SourceStrategy::marketplace`]. Failures yield an empty list.
    fn search<'a>(
        &'a self,
        keyword: &'a str,
        required_amount: f64,
        low_sugar: bool,
    ) -> CandidateFuture<'a>;

    fn describe(&self) -> StrategyDescriptor {
        StrategyDescriptor {
            marketplace: self.marketplace(),
            nutrition: self.supports_nutrition(),
            sources: Vec::new(),
        }
    }
}

/// Snapshot used by the `sources` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDescriptor {
    pub marketplace: Marketplace,
    pub nutrition: bool,
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<&'static str>,
}

/// Strategy backed by an ordered fallback chain of adapters.
#[derive(Clone)]
pub struct MarketStrategy {
    marketplace: Marketplace,
    chain: Vec<Arc<dyn SourceAdapter>>,
    attempt_timeout: Duration,
}

impl MarketStrategy {
    pub fn new(marketplace: Marketplace) -> Self {
        Self {
            marketplace,
            chain: Vec::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Appends `adapter` to the end of the fallback chain.
    pub fn with_source(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.chain.push(adapter);
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    async fn run_chain(&self, keyword: &str, required_amount: f64, low_sugar: bool) -> Vec<CandidateProduct> {
        for adapter in &self.chain {
            let source = adapter.name();
            debug!(marketplace = %self.marketplace, source, keyword, required_amount, "querying source");

            let records = match tokio::time::timeout(self.attempt_timeout, adapter.fetch(keyword)).await {
                Ok(Ok(records)) => records,
                Ok(Err(error)) => {
                    warn!(
                        marketplace = %self.marketplace,
                        source,
                        code = error.code(),
                        error = %error,
                        "source failed, trying next"
                    );
                    continue;
                }
                Err(_) => {
                    warn!(
                        marketplace = %self.marketplace,
                        source,
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "source timed out, trying next"
                    );
                    continue;
                }
            };

            let fetched = records.len();
            let candidates = self.relevant_candidates(keyword, records);
            if candidates.is_empty() {
                debug!(marketplace = %self.marketplace, source, fetched, "no relevant candidates");
                continue;
            }

            let by_sugar = low_sugar && adapter.reports_nutrition();
            let ranked = rank(candidates, by_sugar);
            debug!(
                marketplace = %self.marketplace,
                source,
                fetched,
                candidates = ranked.len(),
                "source answered"
            );
            return ranked;
        }

        Vec::new()
    }

    fn relevant_candidates(&self, keyword: &str, records: Vec<RawRecord>) -> Vec<CandidateProduct> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter_map(|record| match to_candidate(self.marketplace, record, keyword) {
                Ok(candidate) => Some(candidate),
                Err(error) => {
                    debug!(marketplace = %self.marketplace, error = %error, "dropping malformed record");
                    None
                }
            })
            .filter(|candidate| is_relevant(candidate.name(), keyword))
            .filter(|candidate| seen.insert(candidate.source_id().to_owned()))
            .collect()
    }
}

impl std::fmt::Debug for MarketStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStrategy")
            .field("marketplace", &self.marketplace)
            .field(
                "chain",
                &self.chain.iter().map(|adapter| adapter.name()).collect::<Vec<_>>(),
            )
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl SourceStrategy for MarketStrategy {
    fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    fn supports_nutrition(&self) -> bool {
        self.chain.iter().any(|adapter| adapter.reports_nutrition())
    }

    fn search<'a>(
        &'a self,
        keyword: &'a str,
        required_amount: f64,
        low_sugar: bool,
    ) -> CandidateFuture<'a> {
        Box::pin(self.run_chain(keyword, required_amount, low_sugar))
    }

    fn describe(&self) -> StrategyDescriptor {
        StrategyDescriptor {
            marketplace: self.marketplace,
            nutrition: self.supports_nutrition(),
            sources: self
                .chain
                .iter()
                .map(|adapter| SourceDescriptor {
                    name: adapter.name(),
                    circuit: adapter.circuit_state().map(|state| state.as_str()),
                })
                .collect(),
        }
    }
}

/// Price ascending, or sugar ascending with unknown sugar last. Source id
/// breaks remaining ties.
fn rank(mut candidates: Vec<CandidateProduct>, by_sugar: bool) -> Vec<CandidateProduct> {
    candidates.sort_by(|left, right| {
        let sugar = if by_sugar {
            match (left.sugar_per_100g(), right.sugar_per_100g()) {
                (Some(l), Some(r)) => l.total_cmp(&r),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        } else {
            std::cmp::Ordering::Equal
        };
        sugar
            .then_with(|| left.price().cmp(&right.price()))
            .then_with(|| left.source_id().cmp(right.source_id()))
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
