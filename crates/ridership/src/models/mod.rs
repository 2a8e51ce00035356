//! Ridership data models, types, and errors.

pub mod calendar;
pub mod types;

// Re-exports for convenience
pub use calendar::{from_year_month, month_start, parse_month, DateRange};
pub use types::{InsufficientData, MetricResult, Result, RidershipError, StopRole, TripRecord};
