//! Core business logic abstractions

pub mod config;
pub mod fundamentals;
pub mod log;
pub mod qualitative;
pub mod record;

// Re-export main types for cleaner imports
pub use fundamentals::FundamentalsProvider;
pub use qualitative::{QualitativeProvider, QualitativeResolver};
pub use record::{NormalizedFinancials, QualitativeScores, RawFinancialRecord, StockRecord};
