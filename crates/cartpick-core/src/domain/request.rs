use crate::{MarketplaceSelection, ValidationError};

/// Per-call search input for the best-match selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub keyword: String,
    pub required_amount: f64,
    pub targets: MarketplaceSelection,
}

impl SearchRequest {
    pub fn new(
        keyword: impl Into<String>,
        required_amount: f64,
        targets: MarketplaceSelection,
    ) -> Result<Self, ValidationError> {
        let keyword = keyword.into().trim().to_owned();
        if keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }
        if !required_amount.is_finite() || required_amount < 0.0 {
            return Err(ValidationError::InvalidRequiredAmount {
                value: required_amount,
            });
        }

        Ok(Self {
            keyword,
            required_amount,
            targets,
        })
    }
}
