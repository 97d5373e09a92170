//! The valuation and allocation engine.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! state, safe to call from concurrent tasks.

pub mod allocation;
pub mod growth;
pub mod normalize;
pub mod score;
pub mod valuation;

pub use allocation::{AllocationResult, Candidate, allocate, broad_sector};
pub use score::{COMPOSITE_WEIGHTS, calculate_weighted_score, compose_sub_scores};
pub use valuation::{DcfPolicy, ValuationResult, calculate_dcf};
