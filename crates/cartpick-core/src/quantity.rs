//! Portion scaling and purchase quantity arithmetic.
//!
//! Pure functions; safe to call from any number of tasks.

use tracing::debug;

use crate::CoreError;

/// Converts a recipe amount written for `base_portion` servings into the amount
/// needed for `target_portion` servings.
pub fn scale_amount(
    original_amount: f64,
    base_portion: i64,
    target_portion: i64,
) -> Result<f64, CoreError> {
    if base_portion <= 0 || target_portion <= 0 {
        return Err(CoreError::InvalidPortion {
            base: base_portion,
            target: target_portion,
        });
    }
    if !original_amount.is_finite() {
        return Err(CoreError::InvalidAmount {
            value: original_amount,
        });
    }

    if base_portion == target_portion {
        return Ok(original_amount);
    }

    let required = original_amount / base_portion as f64 * target_portion as f64;
    debug!(
        original_amount,
        required, base_portion, target_portion, "scaled ingredient amount"
    );
    Ok(required)
}

/// Smallest number of items of `unit_capacity` that covers `required_amount`.
///
/// A non-positive requirement needs no items.
pub fn purchase_quantity(required_amount: f64, unit_capacity: i64) -> Result<u64, CoreError> {
    if unit_capacity <= 0 {
        return Err(CoreError::InvalidCapacity {
            capacity: unit_capacity,
        });
    }
    if !required_amount.is_finite() {
        return Err(CoreError::InvalidAmount {
            value: required_amount,
        });
    }
    if required_amount <= 0.0 {
        return Ok(0);
    }

    let capacity = unit_capacity as f64;
    let mut quantity = (required_amount / capacity).ceil();
    // Float division can land one step off for exact multiples.
    if (quantity - 1.0) * capacity >= required_amount {
        quantity -= 1.0;
    } else if quantity * capacity < required_amount {
        quantity += 1.0;
    }

    let quantity = quantity as u64;
    debug!(required_amount, unit_capacity, quantity, "computed purchase quantity");
    Ok(quantity)
}

/// Base and target servings of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingContext {
    base_portion: i64,
    target_portion: i64,
}

impl ScalingContext {
    pub fn new(base_portion: i64, target_portion: i64) -> Result<Self, CoreError> {
        if base_portion <= 0 || target_portion <= 0 {
            return Err(CoreError::InvalidPortion {
                base: base_portion,
                target: target_portion,
            });
        }
        Ok(Self {
            base_portion,
            target_portion,
        })
    }

    pub const fn base_portion(self) -> i64 {
        self.base_portion
    }

    pub const fn target_portion(self) -> i64 {
        self.target_portion
    }

    pub fn scale(self, original_amount: f64) -> Result<f64, CoreError> {
        scale_amount(original_amount, self.base_portion, self.target_portion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_to_the_same_portion_is_identity() {
        for amount in [0.0, 0.1, 1.0, 3.3, 250.0, 1_000_000.7] {
            for portion in [1, 2, 3, 7, 12] {
                assert_eq!(scale_amount(amount, portion, portion), Ok(amount));
            }
        }
    }

    #[test]
    fn scales_linearly_between_portions() {
        assert_eq!(scale_amount(300.0, 2, 4), Ok(600.0));
        assert_eq!(scale_amount(500.0, 4, 1), Ok(125.0));
    }

    #[test]
    fn rejects_non_positive_portions() {
        assert_eq!(
            scale_amount(100.0, 0, 2),
            Err(CoreError::InvalidPortion { base: 0, target: 2 })
        );
        assert!(scale_amount(100.0, 2, -1).is_err());
        assert!(ScalingContext::new(1, 0).is_err());
    }

    #[test]
    fn purchase_quantity_is_smallest_covering_count() {
        let cases = [
            (1000.0, 900, 2),
            (1000.0, 1000, 1),
            (1.0, 1, 1),
            (2001.0, 1000, 3),
            (0.3, 1, 1),
            (4800.0, 200, 24),
        ];
        for (required, capacity, expected) in cases {
            let quantity = purchase_quantity(required, capacity).expect("valid");
            assert_eq!(quantity, expected, "required={required} capacity={capacity}");
            assert!(quantity as f64 * capacity as f64 >= required);
            assert!((quantity.saturating_sub(1)) as f64 * (capacity as f64) < required);
        }
    }

    #[test]
    fn exact_multiples_do_not_round_up() {
        assert_eq!(purchase_quantity(3000.0, 1000), Ok(3));
        assert_eq!(purchase_quantity(0.7, 7), Ok(1));
        assert_eq!(purchase_quantity(2.1, 7), Ok(1));
    }

    #[test]
    fn rejects_non_positive_capacity() {
        assert_eq!(
            purchase_quantity(10.0, 0),
            Err(CoreError::InvalidCapacity { capacity: 0 })
        );
        assert!(purchase_quantity(10.0, -5).is_err());
    }

    #[test]
    fn zero_requirement_needs_nothing() {
        assert_eq!(purchase_quantity(0.0, 500), Ok(0));
    }

    #[test]
    fn context_scales_with_its_portions() {
        let context = ScalingContext::new(2, 3).expect("valid");
        assert_eq!(context.scale(200.0), Ok(300.0));
    }
}
