//! Core business logic abstractions

pub mod cache;
pub mod change;
pub mod config;
pub mod error;
pub mod log;
pub mod period;
pub mod quote;
pub mod series;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use error::QuoteError;
pub use period::{Period, Window};
pub use quote::{ChangeBasis, FailurePolicy, SpotProvider, SpotQuote};
pub use series::{HistoricalRecord, PricePoint, SeriesGenerator};
