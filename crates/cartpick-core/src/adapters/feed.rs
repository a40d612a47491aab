use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::Upstream;
use crate::circuit_breaker::CircuitState;
use crate::data_source::{AdapterFuture, RawRecord, SourceAdapter, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::throttling::Throttle;
use crate::Marketplace;

/// JSON product feed exported by a marketplace-side product repository.
///
/// Expected shape: `{ "products": [ { "id", "name", "price", "capacity",
/// "unit", "inStock", "sugarPer100g", "url" } ] }`. The feed filters by
/// keyword server side; rows with an empty name are skipped.
#[derive(Debug, Clone)]
pub struct ProductFeedAdapter {
    marketplace: Marketplace,
    feed_url: String,
    upstream: Upstream,
    request_timeout: Duration,
}

impl ProductFeedAdapter {
    pub fn new(marketplace: Marketplace, feed_url: impl Into<String>) -> Self {
        Self::with_http_client(marketplace, feed_url, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(
        marketplace: Marketplace,
        feed_url: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        let name = feed_name(marketplace);
        Self {
            marketplace,
            feed_url: feed_url.into(),
            upstream: Upstream::new(name, http_client, Throttle::new(name, Duration::from_secs(1), 20)),
            request_timeout: Duration::from_secs(3),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.upstream = self.upstream.with_retry(retry);
        self
    }

    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    async fn load(&self, keyword: &str) -> Result<Vec<RawRecord>, SourceError> {
        let request = HttpRequest::get(&self.feed_url)
            .with_query("keyword", keyword)
            .with_header("accept", "application/json")
            .with_timeout(self.request_timeout);

        let body = self.upstream.get_body(request).await?;
        let feed: ProductFeed = serde_json::from_str(&body).map_err(|e| {
            SourceError::malformed(format!("{} product feed: {e}", self.marketplace))
        })?;

        Ok(feed
            .products
            .into_iter()
            .filter(|record| !record.name.trim().is_empty())
            .collect())
    }
}

impl SourceAdapter for ProductFeedAdapter {
    fn name(&self) -> &'static str {
        feed_name(self.marketplace)
    }

    fn fetch<'a>(&'a self, keyword: &'a str) -> AdapterFuture<'a> {
        Box::pin(self.load(keyword))
    }

    fn reports_nutrition(&self) -> bool {
        true
    }

    fn circuit_state(&self) -> Option<CircuitState> {
        Some(self.upstream.circuit_state())
    }
}

fn feed_name(marketplace: Marketplace) -> &'static str {
    match marketplace {
        Marketplace::Coupang => "coupang-feed",
        Marketplace::Kurly => "kurly-feed",
        Marketplace::Bmart => "bmart-feed",
        Marketplace::Naver => "naver-feed",
    }
}

#[derive(Debug, Deserialize)]
struct ProductFeed {
    #[serde(default)]
    products: Vec<RawRecord>,
}
