use thiserror::Error;

use crate::Marketplace;

/// Validation and contract errors exposed by `cartpick-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("search keyword cannot be empty")]
    EmptyKeyword,
    #[error("required amount must be finite and non-negative: {value}")]
    InvalidRequiredAmount { value: f64 },

    #[error("invalid marketplace '{value}', expected one of coupang, kurly, bmart, naver")]
    InvalidMarketplace { value: String },
    #[error("marketplace selection must name at least one marketplace")]
    EmptySelection,

    #[error("candidate name cannot be empty")]
    EmptyProductName,
    #[error("candidate price must be non-negative: {value}")]
    NegativePrice { value: i64 },
    #[error("candidate capacity must be at least 1: {value}")]
    InvalidCapacityUnits { value: i64 },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("request id must be at least 8 characters")]
    InvalidRequestId,
    #[error("invalid schema version '{value}', expected vMAJOR.MINOR.PATCH")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Configuration errors that cross the core's public boundary.
///
/// Source failures never appear here; strategies absorb them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown marketplace: no strategy registered for '{0}'")]
    UnknownMarketplace(Marketplace),

    #[error("strategy for '{0}' registered more than once")]
    DuplicateStrategy(Marketplace),

    #[error("invalid portion: base={base}, target={target} (both must be greater than 0)")]
    InvalidPortion { base: i64, target: i64 },

    #[error("invalid capacity: {capacity} (must be greater than 0)")]
    InvalidCapacity { capacity: i64 },

    #[error("invalid amount: {value} (must be finite)")]
    InvalidAmount { value: f64 },
}

impl CoreError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "config.validation",
            Self::UnknownMarketplace(_) => "config.unknown_marketplace",
            Self::DuplicateStrategy(_) => "config.duplicate_strategy",
            Self::InvalidPortion { .. } => "config.invalid_portion",
            Self::InvalidCapacity { .. } => "config.invalid_capacity",
            Self::InvalidAmount { .. } => "config.invalid_amount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_marketplace_message_names_the_marketplace() {
        let error = CoreError::UnknownMarketplace(Marketplace::Naver);
        assert!(error.to_string().contains("naver"));
        assert_eq!(error.code(), "config.unknown_marketplace");
    }

    #[test]
    fn validation_errors_convert_transparently() {
        let error = CoreError::from(ValidationError::EmptyKeyword);
        assert_eq!(error.to_string(), "search keyword cannot be empty");
    }
}
