//! # Domain Models
//!
//! Normalized product model shared by every marketplace strategy.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CandidateProduct`] | One normalized search result from one marketplace |
//! | [`SearchRequest`] | Keyword, required amount and target marketplaces |
//!
//! Candidate invariants (`price >= 0`, `capacity_units >= 1`, non-empty name)
//! are enforced at construction time:
//!
//! ```rust
//! use cartpick_core::{CandidateProduct, Marketplace, ValidationError};
//!
//! let milk = CandidateProduct::new(Marketplace::Bmart, "b-1", "서울우유 1L", 2980, 1000)
//!     .expect("valid candidate");
//! assert_eq!(milk.capacity_units(), 1000);
//!
//! let invalid = CandidateProduct::new(Marketplace::Bmart, "b-2", "우유", 2980, 0);
//! assert!(matches!(invalid, Err(ValidationError::InvalidCapacityUnits { .. })));
//! ```

mod product;
mod request;

pub use product::CandidateProduct;
pub use request::SearchRequest;
