//! Distance calculations and spatial bucketing.

pub mod grid;
pub mod queries;

pub use grid::{DensityGrid, GridCell};
pub use queries::{distance_between, haversine_km, Region, EARTH_RADIUS_KM};
