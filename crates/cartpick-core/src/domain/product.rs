use std::cmp::Ordering;

use serde::Serialize;

use crate::{Marketplace, ValidationError};

const DEFAULT_UNIT_LABEL: &str = "개";

/// A single normalized search result from one marketplace.
///
/// Constructed fresh per search call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateProduct {
    source_id: String,
    name: String,
    price: u64,
    marketplace: Marketplace,
    capacity_units: u32,
    unit_label: String,
    in_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sugar_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
}

impl CandidateProduct {
    pub fn new(
        marketplace: Marketplace,
        source_id: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        capacity_units: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyProductName);
        }
        if price < 0 {
            return Err(ValidationError::NegativePrice { value: price });
        }
        let capacity_units = u32::try_from(capacity_units)
            .ok()
            .filter(|units| *units >= 1)
            .ok_or(ValidationError::InvalidCapacityUnits {
                value: capacity_units,
            })?;

        Ok(Self {
            source_id: source_id.into(),
            name,
            price: price.unsigned_abs(),
            marketplace,
            capacity_units,
            unit_label: String::from(DEFAULT_UNIT_LABEL),
            in_stock: true,
            sugar_per_100g: None,
            source_url: None,
        })
    }

    pub fn with_unit_label(mut self, unit_label: impl Into<String>) -> Self {
        let unit_label = unit_label.into();
        if !unit_label.trim().is_empty() {
            self.unit_label = unit_label;
        }
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    pub fn with_sugar_per_100g(mut self, sugar: Option<f64>) -> Result<Self, ValidationError> {
        if let Some(value) = sugar {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: "sugar_per_100g",
                });
            }
        }
        self.sugar_per_100g = sugar;
        Ok(self)
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn price(&self) -> u64 {
        self.price
    }

    pub const fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    pub const fn capacity_units(&self) -> u32 {
        self.capacity_units
    }

    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    pub const fn in_stock(&self) -> bool {
        self.in_stock
    }

    pub const fn sugar_per_100g(&self) -> Option<f64> {
        self.sugar_per_100g
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Globally unique key: source ids only have to be unique per marketplace.
    pub fn key(&self) -> (Marketplace, &str) {
        (self.marketplace, self.source_id.as_str())
    }

    /// Price per capacity unit.
    pub fn unit_price(&self) -> f64 {
        self.price as f64 / f64::from(self.capacity_units.max(1))
    }

    /// Exact unit price comparison (`price_a * cap_b` against `price_b * cap_a`).
    pub fn cmp_unit_price(&self, other: &Self) -> Ordering {
        let left = u128::from(self.price) * u128::from(other.capacity_units.max(1));
        let right = u128::from(other.price) * u128::from(self.capacity_units.max(1));
        left.cmp(&right)
    }

    /// Absolute distance between this item's capacity and a required amount.
    pub fn capacity_distance(&self, required_amount: f64) -> f64 {
        (f64::from(self.capacity_units) - required_amount).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk(price: i64, capacity: i64) -> CandidateProduct {
        CandidateProduct::new(Marketplace::Bmart, "1", "우유", price, capacity).expect("valid")
    }

    #[test]
    fn rejects_negative_price_and_zero_capacity() {
        let err = CandidateProduct::new(Marketplace::Kurly, "1", "우유", -1, 1).expect_err("fail");
        assert_eq!(err, ValidationError::NegativePrice { value: -1 });

        let err = CandidateProduct::new(Marketplace::Kurly, "1", "우유", 100, 0).expect_err("fail");
        assert_eq!(err, ValidationError::InvalidCapacityUnits { value: 0 });
    }

    #[test]
    fn defaults_to_in_stock_and_count_unit() {
        let product = milk(1000, 1);
        assert!(product.in_stock());
        assert_eq!(product.unit_label(), "개");
        assert_eq!(product.sugar_per_100g(), None);
    }

    #[test]
    fn unit_price_comparison_is_exact() {
        let a = milk(2690, 900);
        let b = milk(2980, 1000);
        assert_eq!(b.cmp_unit_price(&a), Ordering::Less);

        let c = milk(300, 3);
        let d = milk(100, 1);
        assert_eq!(c.cmp_unit_price(&d), Ordering::Equal);
    }

    #[test]
    fn non_finite_sugar_is_rejected() {
        let err = milk(1000, 1)
            .with_sugar_per_100g(Some(f64::NAN))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { .. }));
    }
}
