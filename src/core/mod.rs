//! Projection engine over the startup list: normalization, money parsing,
//! filtering, aggregation and export.

pub mod analytics;
pub mod config;
pub mod export;
pub mod filter;
pub mod log;
pub mod money;
pub mod record;
pub mod source;

// Re-export main types for cleaner imports
pub use filter::{FilterState, SortDirection, SortField, SortState};
pub use money::{ConversionRates, RawAmount, format_short, parse_amount};
pub use record::{CanonicalRecord, RawRecord, normalize};
pub use source::{LoadState, PageState, StartupSource};
