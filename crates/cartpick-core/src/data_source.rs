//! Source adapter contract and raw record type.
//!
//! A [`SourceAdapter`] is the black-box collaborator behind a marketplace
//! strategy: an API client, a product feed, or a simulated catalog. It may fail
//! in any way it likes; the owning strategy turns every failure into an empty
//! candidate list.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartpick_core::{RawRecord, SourceAdapter, SourceError, AdapterFuture};
//!
//! struct FixedAdapter(Vec<RawRecord>);
//!
//! impl SourceAdapter for FixedAdapter {
//!     fn name(&self) -> &'static str {
//!         "fixed"
//!     }
//!
//!     fn fetch<'a>(&'a self, _keyword: &'a str) -> AdapterFuture<'a> {
//!         let records = self.0.clone();
//!         Box::pin(async move { Ok(records) })
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::CircuitState;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Timeout,
    Malformed,
    NotConfigured,
    Internal,
}

/// Structured adapter failure. Strategies log it and move to the next source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotConfigured,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::NotConfigured => "source.not_configured",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Un-normalized product record as returned by an adapter.
///
/// Only `name` and `price` are guaranteed; everything else is best effort.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, alias = "id")]
    pub source_id: Option<String>,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub sugar_per_100g: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawRecord {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_capacity(mut self, capacity: i64, unit: impl Into<String>) -> Self {
        self.capacity = Some(capacity);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    pub fn with_sugar_per_100g(mut self, sugar: f64) -> Self {
        self.sugar_per_100g = Some(sugar);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

pub type AdapterFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>>;

/// Upstream lookup wrapped by a marketplace strategy.
///
/// Implementations must be `Send + Sync`; one adapter instance serves every
/// concurrent search for its marketplace.
pub trait SourceAdapter: Send + Sync {
    /// Short label used in logs and the `sources` listing.
    fn name(&self) -> &'static str;

    /// Fetches raw records for `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the upstream is unreachable, rate limited,
    /// not configured, or answers with something that cannot be parsed.
    fn fetch<'a>(&'a self, keyword: &'a str) -> AdapterFuture<'a>;

    /// Whether records from this adapter carry nutrition data.
    fn reports_nutrition(&self) -> bool {
        false
    }

    /// Breaker state for adapters that call a remote upstream.
    fn circuit_state(&self) -> Option<CircuitState> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::timeout("slow").code(), "source.timeout");
        assert_eq!(SourceError::not_configured("x").code(), "source.not_configured");
        assert!(SourceError::rate_limited("x").retryable());
        assert!(!SourceError::malformed("x").retryable());
    }

    #[test]
    fn raw_record_deserializes_feed_fields() {
        let record: RawRecord = serde_json::from_str(
            r#"{"id":"c-1","name":"서울우유 1L","price":2980,"capacity":1000,"unit":"ml","inStock":false,"sugarPer100g":4.5}"#,
        )
        .expect("valid record");

        assert_eq!(record.source_id.as_deref(), Some("c-1"));
        assert_eq!(record.capacity, Some(1000));
        assert_eq!(record.in_stock, Some(false));
        assert_eq!(record.sugar_per_100g, Some(4.5));
        assert_eq!(record.url, None);
    }
}
