use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical marketplace identifiers shared between the core and its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Coupang,
    Kurly,
    Bmart,
    Naver,
}

impl Marketplace {
    pub const ALL: [Self; 4] = [Self::Coupang, Self::Kurly, Self::Bmart, Self::Naver];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coupang => "coupang",
            Self::Kurly => "kurly",
            Self::Bmart => "bmart",
            Self::Naver => "naver",
        }
    }

    /// Public search page for `keyword` on this marketplace.
    ///
    /// B-mart has no web storefront, so its link goes through Naver shopping.
    pub fn search_url(self, keyword: &str) -> String {
        let encoded = urlencoding::encode(keyword.trim());
        match self {
            Self::Coupang => format!("https://www.coupang.com/np/search?q={encoded}"),
            Self::Kurly => format!("https://www.kurly.com/search?searchTerm={encoded}"),
            Self::Naver => format!("https://search.shopping.naver.com/search/all?query={encoded}"),
            Self::Bmart => format!(
                "https://search.shopping.naver.com/search/all?query={}+{encoded}",
                urlencoding::encode("B마트")
            ),
        }
    }
}

impl Display for Marketplace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coupang" => Ok(Self::Coupang),
            "kurly" => Ok(Self::Kurly),
            "bmart" => Ok(Self::Bmart),
            "naver" => Ok(Self::Naver),
            other => Err(ValidationError::InvalidMarketplace {
                value: other.to_owned(),
            }),
        }
    }
}

/// Target marketplaces of a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MarketplaceSelection {
    /// Every marketplace with a registered strategy.
    #[default]
    All,
    Only(BTreeSet<Marketplace>),
}

impl MarketplaceSelection {
    /// Parses `all`, an empty string, or a comma separated list of identifiers.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let marketplaces = trimmed
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Marketplace::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;

        Self::only(marketplaces)
    }

    pub fn only(marketplaces: impl IntoIterator<Item = Marketplace>) -> Result<Self, ValidationError> {
        let marketplaces = marketplaces.into_iter().collect::<BTreeSet<_>>();
        if marketplaces.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(Self::Only(marketplaces))
    }

    /// Resolves the selection against the registered marketplaces, in id order.
    pub fn resolve(&self, registered: &[Marketplace]) -> Vec<Marketplace> {
        match self {
            Self::All => {
                let mut all = registered.to_vec();
                all.sort();
                all.dedup();
                all
            }
            Self::Only(marketplaces) => marketplaces.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_case_insensitively() {
        assert_eq!(" COUPANG ".parse::<Marketplace>(), Ok(Marketplace::Coupang));
        assert_eq!("BMart".parse::<Marketplace>(), Ok(Marketplace::Bmart));
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = "gmarket".parse::<Marketplace>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidMarketplace { .. }));
    }

    #[test]
    fn selection_parses_all_and_lists() {
        assert_eq!(MarketplaceSelection::parse("ALL"), Ok(MarketplaceSelection::All));
        assert_eq!(MarketplaceSelection::parse(""), Ok(MarketplaceSelection::All));

        let selection = MarketplaceSelection::parse("kurly, coupang,kurly").expect("valid");
        assert_eq!(
            selection.resolve(&Marketplace::ALL),
            vec![Marketplace::Coupang, Marketplace::Kurly]
        );
    }

    #[test]
    fn selection_with_unknown_identifier_is_a_configuration_error() {
        assert!(MarketplaceSelection::parse("coupang,amazon").is_err());
        assert_eq!(MarketplaceSelection::parse(" , "), Err(ValidationError::EmptySelection));
    }

    #[test]
    fn bmart_search_link_goes_through_naver_shopping() {
        let url = Marketplace::Bmart.search_url("우유");
        assert!(url.starts_with("https://search.shopping.naver.com/search/all?query="));
        assert!(url.ends_with(&urlencoding::encode("우유").into_owned()));
    }
}
