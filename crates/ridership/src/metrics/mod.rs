//! Metric aggregator: pure summaries of a (possibly filtered) view.
//!
//! Every operation returns a [`MetricResult`](crate::models::MetricResult);
//! empty or degenerate inputs come back as
//! [`InsufficientData`](crate::models::InsufficientData), never a panic.

pub mod correlation;
pub mod distribution;
pub mod hotspot;
pub mod overview;
pub mod ranking;
pub mod stats;
pub mod trend;

pub use correlation::{distance_correlation, CorrelationSummary, DistancePoint, Strength};
pub use distribution::{distribution, DistributionSummary};
pub use hotspot::{hotspots, DensityLevel, Hotspots};
pub use overview::{headline, overview, Headline, Overview};
pub use ranking::{busiest_route, most_frequent_origin, top_routes, top_stops, RouteRank, StopRank};
pub use trend::{growth_pct, monthly_totals, trend, MonthlyPoint, TrendDirection, TrendSummary};
