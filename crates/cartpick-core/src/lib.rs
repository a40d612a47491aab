//! # Cartpick Core
//!
//! Cross-marketplace grocery search: relevance filtering, per-marketplace
//! source strategies with fallback chains, and best-match selection by unit
//! price.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Source adapters (Kurly API, Naver shopping API, product feeds, simulated catalogs) |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`data_source`] | Source adapter trait, raw records and adapter errors |
//! | [`domain`] | Candidate product and search request |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Validation and configuration errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`marketplace`] | Marketplace identifiers and selections |
//! | [`normalize`] | Raw record normalization and capacity parsing |
//! | [`quantity`] | Portion scaling and purchase quantities |
//! | [`registry`] | Strategy registry and its builder |
//! | [`relevance`] | Keyword relevance heuristic |
//! | [`retry`] | Retry backoff |
//! | [`selector`] | Best-match selector |
//! | [`strategy`] | Source strategy trait and fallback-chain strategy |
//! | [`throttling`] | Client-side rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cartpick_core::{BestMatchSelector, MarketplaceSelection, SelectorConfig, StrategyRegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(StrategyRegistryBuilder::new().with_mock_mode().build());
//!     let selector = BestMatchSelector::new(registry, SelectorConfig::default());
//!
//!     if let Some(best) = selector
//!         .find_best_match("우유", 1000.0, &MarketplaceSelection::All)
//!         .await?
//!     {
//!         println!("{} at {} ({:.2}/unit)", best.product.name(), best.marketplace, best.unit_price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  CLI / caller       │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │ Best-Match Selector │────▶│ Strategy Registry│
//! └──────────┬──────────┘     └──────────────────┘
//!            │ one task per marketplace
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │ Source Strategy     │────▶│ Relevance Filter │
//! │ (fallback chain)    │     └──────────────────┘
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │ Source Adapter      │────▶│ HTTP Client      │
//! │ (API/feed/catalog)  │     │ breaker/throttle │
//! └─────────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Only configuration errors ([`CoreError`]) cross the public boundary.
//! Adapter failures are [`SourceError`]s, absorbed by the strategy:
//!
//! ```rust
//! use cartpick_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Timeout | SourceErrorKind::Unavailable => "try the next source",
//!         SourceErrorKind::NotConfigured => "missing credentials",
//!         _ => "skip",
//!     }
//! }
//!
//! assert_eq!(describe(&SourceError::timeout("slow")), "try the next source");
//! ```

pub mod adapters;
pub mod circuit_breaker;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod marketplace;
pub mod normalize;
pub mod quantity;
pub mod registry;
pub mod relevance;
pub mod retry;
pub mod selector;
pub mod strategy;
pub mod throttling;

pub use adapters::{
    CatalogAdapter, KurlySearchAdapter, NaverCredentials, NaverShoppingAdapter, ProductFeedAdapter,
};

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

pub use data_source::{AdapterFuture, RawRecord, SourceAdapter, SourceError, SourceErrorKind};

pub use domain::{CandidateProduct, SearchRequest};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

pub use error::{CoreError, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

pub use marketplace::{Marketplace, MarketplaceSelection};

pub use quantity::{purchase_quantity, scale_amount, ScalingContext};

pub use registry::{StrategyRegistry, StrategyRegistryBuilder};

pub use relevance::is_relevant;

pub use retry::{Backoff, RetryConfig};

pub use selector::{
    compare_offers, BestMatch, BestMatchSelector, PurchasePlan, SearchOutcome, SelectorConfig,
    SourceReport, SourceStatus,
};

pub use strategy::{
    CandidateFuture, MarketStrategy, SourceDescriptor, SourceStrategy, StrategyDescriptor,
    MAX_CANDIDATES,
};

pub use throttling::Throttle;
