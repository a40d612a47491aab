//! Source adapters feeding the marketplace strategies.
//!
//! | Adapter | Upstream |
//! |---------|----------|
//! | [`KurlySearchAdapter`] | Kurly search API |
//! | [`NaverShoppingAdapter`] | Naver shopping open API |
//! | [`ProductFeedAdapter`] | JSON product feed exported by a marketplace-side repository |
//! | [`CatalogAdapter`] | In-memory simulated catalog |

mod catalog;
mod feed;
mod kurly;
mod naver;

use std::sync::Arc;

use tracing::debug;

pub use catalog::CatalogAdapter;
pub use feed::ProductFeedAdapter;
pub use kurly::KurlySearchAdapter;
pub use naver::{NaverCredentials, NaverShoppingAdapter};

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::http_client::{HttpClient, HttpRequest};
use crate::retry::RetryConfig;
use crate::throttling::Throttle;
use crate::{SourceError, SourceErrorKind};

/// Resilience wrapper shared by the HTTP adapters: circuit breaker, client
/// side throttle and retry policy around one upstream.
#[derive(Clone)]
pub(crate) struct Upstream {
    name: &'static str,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    throttle: Throttle,
    retry: RetryConfig,
}

impl Upstream {
    pub(crate) fn new(name: &'static str, http_client: Arc<dyn HttpClient>, throttle: Throttle) -> Self {
        Self {
            name,
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::for_upstream(name)),
            throttle,
            retry: RetryConfig::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub(crate) fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Executes `request` and returns the body of a 2xx response.
    pub(crate) async fn get_body(&self, request: HttpRequest) -> Result<String, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(format!(
                "{} circuit breaker is open; skipping upstream call",
                self.name
            )));
        }

        let result = self
            .retry
            .run(self.name, || self.attempt(request.clone()))
            .await;
        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            // Local configuration problems say nothing about upstream health.
            Err(error) if error.kind() == SourceErrorKind::NotConfigured => {}
            Err(_) => self.circuit_breaker.record_failure(),
        }
        result
    }

    async fn attempt(&self, request: HttpRequest) -> Result<String, SourceError> {
        self.throttle.acquire()?;
        debug!(upstream = self.name, url = %request.full_url(), "calling upstream");

        let response = self.http_client.execute(request).await?;
        if let Some(error) = response.error_for_status(self.name) {
            return Err(error);
        }
        Ok(response.body)
    }
}

impl std::fmt::Debug for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upstream")
            .field("name", &self.name)
            .field("circuit_state", &self.circuit_state())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
