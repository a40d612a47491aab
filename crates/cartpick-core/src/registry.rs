use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::adapters::{
    CatalogAdapter, KurlySearchAdapter, NaverCredentials, NaverShoppingAdapter, ProductFeedAdapter,
};
use crate::data_source::SourceAdapter;
use crate::http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::strategy::{MarketStrategy, SourceStrategy, StrategyDescriptor, DEFAULT_ATTEMPT_TIMEOUT};
use crate::{CoreError, Marketplace};

/// Read-only mapping from marketplace to its strategy.
///
/// Built once at startup and shared behind an `Arc`; lookups take no lock.
pub struct StrategyRegistry {
    strategies: HashMap<Marketplace, Arc<dyn SourceStrategy>>,
}

impl StrategyRegistry {
    /// Registers every strategy in `strategies`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateStrategy`] when two strategies claim the
    /// same marketplace.
    pub fn new(strategies: Vec<Arc<dyn SourceStrategy>>) -> Result<Self, CoreError> {
        let mut registered = HashMap::with_capacity(strategies.len());
        for strategy in strategies {
            let marketplace = strategy.marketplace();
            if registered.insert(marketplace, strategy).is_some() {
                return Err(CoreError::DuplicateStrategy(marketplace));
            }
        }
        Ok(Self {
            strategies: registered,
        })
    }

    /// # Errors
    ///
    /// Returns [`CoreError::UnknownMarketplace`] when nothing was registered
    /// for `marketplace`.
    pub fn resolve(&self, marketplace: Marketplace) -> Result<Arc<dyn SourceStrategy>, CoreError> {
        self.strategies
            .get(&marketplace)
            .cloned()
            .ok_or(CoreError::UnknownMarketplace(marketplace))
    }

    /// Registered marketplaces in identifier order.
    pub fn marketplaces(&self) -> Vec<Marketplace> {
        let mut marketplaces = self.strategies.keys().copied().collect::<Vec<_>>();
        marketplaces.sort();
        marketplaces
    }

    pub fn describe(&self) -> Vec<StrategyDescriptor> {
        self.marketplaces()
            .into_iter()
            .filter_map(|marketplace| self.strategies.get(&marketplace))
            .map(|strategy| strategy.describe())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        StrategyRegistryBuilder::new().with_mock_mode().build()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("marketplaces", &self.marketplaces())
            .finish()
    }
}

/// Builder wiring each marketplace to its adapter chain.
///
/// # Environment Variables
///
/// | Setting | Primary Env Var | Fallback Env Var |
/// |---------|-----------------|------------------|
/// | Naver client id | `CARTPICK_NAVER_CLIENT_ID` | `NAVER_CLIENT_ID` |
/// | Naver client secret | `CARTPICK_NAVER_CLIENT_SECRET` | `NAVER_CLIENT_SECRET` |
/// | Coupang product feed | `CARTPICK_COUPANG_FEED_URL` | - |
/// | B-mart product feed | `CARTPICK_BMART_FEED_URL` | - |
/// | Per-source timeout (ms) | `CARTPICK_SOURCE_TIMEOUT_MS` | - |
///
/// # Example
///
/// ```rust
/// use cartpick_core::{Marketplace, StrategyRegistryBuilder};
///
/// let registry = StrategyRegistryBuilder::new()
///     .with_mock_mode()
///     .with_marketplace_enabled(Marketplace::Naver, false)
///     .build();
///
/// assert_eq!(
///     registry.marketplaces(),
///     vec![Marketplace::Coupang, Marketplace::Kurly, Marketplace::Bmart]
/// );
/// ```
pub struct StrategyRegistryBuilder {
    use_mock: bool,
    http_client: Option<Arc<dyn HttpClient>>,
    naver_credentials: Option<NaverCredentials>,
    feed_urls: BTreeMap<Marketplace, String>,
    source_timeout: Duration,
    disabled: BTreeSet<Marketplace>,
    bmart_placeholder: bool,
    retry: RetryConfig,
}

impl Default for StrategyRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistryBuilder {
    pub fn new() -> Self {
        Self {
            use_mock: false,
            http_client: None,
            naver_credentials: None,
            feed_urls: BTreeMap::new(),
            source_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            disabled: BTreeSet::new(),
            bmart_placeholder: true,
            retry: RetryConfig::default(),
        }
    }

    /// Every marketplace answers from its seeded catalog; no network access.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    /// Uses live upstreams, reading credentials and feed URLs from the environment.
    pub fn with_real_clients(mut self) -> Self {
        self.use_mock = false;

        let client_id = env_var("CARTPICK_NAVER_CLIENT_ID", Some("NAVER_CLIENT_ID"));
        let client_secret = env_var("CARTPICK_NAVER_CLIENT_SECRET", Some("NAVER_CLIENT_SECRET"));
        if let (Some(id), Some(secret)) = (client_id, client_secret) {
            self.naver_credentials = NaverCredentials::new(id, secret);
        }

        for (marketplace, name) in [
            (Marketplace::Coupang, "CARTPICK_COUPANG_FEED_URL"),
            (Marketplace::Bmart, "CARTPICK_BMART_FEED_URL"),
        ] {
            if let Some(url) = env_var(name, None) {
                self.feed_urls.insert(marketplace, url);
            }
        }

        if let Some(raw) = env_var("CARTPICK_SOURCE_TIMEOUT_MS", None) {
            match raw.parse::<u64>() {
                Ok(millis) if millis > 0 => self.source_timeout = Duration::from_millis(millis),
                _ => warn!(value = %raw, "ignoring invalid CARTPICK_SOURCE_TIMEOUT_MS"),
            }
        }
        self
    }

    /// Overrides the transport used by every HTTP adapter.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_naver_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.naver_credentials = NaverCredentials::new(client_id, client_secret);
        self
    }

    pub fn with_feed_url(mut self, marketplace: Marketplace, url: impl Into<String>) -> Self {
        self.feed_urls.insert(marketplace, url.into());
        self
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn with_marketplace_enabled(mut self, marketplace: Marketplace, enabled: bool) -> Self {
        if enabled {
            self.disabled.remove(&marketplace);
        } else {
            self.disabled.insert(marketplace);
        }
        self
    }

    pub fn with_bmart_placeholder(mut self, enabled: bool) -> Self {
        self.bmart_placeholder = enabled;
        self
    }

    /// Retry policy for every HTTP adapter.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> StrategyRegistry {
        let http_client: Arc<dyn HttpClient> = match (&self.http_client, self.use_mock) {
            (Some(http_client), _) => Arc::clone(http_client),
            (None, true) => Arc::new(NoopHttpClient),
            (None, false) => Arc::new(ReqwestHttpClient::new()),
        };

        let strategies = Marketplace::ALL
            .into_iter()
            .filter(|marketplace| !self.disabled.contains(marketplace))
            .map(|marketplace| {
                let strategy = self.strategy_for(marketplace, &http_client);
                debug!(marketplace = %marketplace, chain = strategy.chain_len(), "registered strategy");
                (marketplace, Arc::new(strategy) as Arc<dyn SourceStrategy>)
            })
            .collect();

        StrategyRegistry { strategies }
    }

    fn strategy_for(&self, marketplace: Marketplace, http_client: &Arc<dyn HttpClient>) -> MarketStrategy {
        let strategy = MarketStrategy::new(marketplace).with_attempt_timeout(self.source_timeout);
        let catalog = CatalogAdapter::for_marketplace(marketplace)
            .with_placeholder(marketplace == Marketplace::Bmart && self.bmart_placeholder);
        if self.use_mock {
            return strategy.with_source(Arc::new(catalog));
        }

        let primary: Option<Arc<dyn SourceAdapter>> = match marketplace {
            Marketplace::Coupang | Marketplace::Bmart => self.feed_urls.get(&marketplace).map(|url| {
                Arc::new(
                    ProductFeedAdapter::with_http_client(marketplace, url, Arc::clone(http_client))
                        .with_request_timeout(self.source_timeout)
                        .with_retry(self.retry.clone()),
                ) as Arc<dyn SourceAdapter>
            }),
            Marketplace::Kurly => Some(Arc::new(
                KurlySearchAdapter::with_http_client(Arc::clone(http_client))
                    .with_request_timeout(self.source_timeout)
                    .with_retry(self.retry.clone()),
            ) as Arc<dyn SourceAdapter>),
            Marketplace::Naver => Some(Arc::new(
                NaverShoppingAdapter::with_http_client(
                    Arc::clone(http_client),
                    self.naver_credentials.clone(),
                )
                .with_request_timeout(self.source_timeout)
                .with_retry(self.retry.clone()),
            ) as Arc<dyn SourceAdapter>),
        };

        // Live upstreams first, the seeded catalog last.
        match primary {
            Some(primary) => strategy.with_source(primary).with_source(Arc::new(catalog)),
            None => strategy.with_source(Arc::new(catalog)),
        }
    }
}

fn env_var(primary: &str, fallback: Option<&str>) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| fallback.and_then(|name| env::var(name).ok()))
        .filter(|value| !value.trim().is_empty())
}
