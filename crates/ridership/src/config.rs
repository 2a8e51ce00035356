//! Tunables for the metric pipeline.

use chrono::NaiveDate;

use crate::models::DateRange;
use crate::spatial::Region;

/// Constants every aggregator reads. `Default` holds the values the
/// TransJakarta 2021 dashboard was built around.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Rows kept in each ranking table
    pub top_n: usize,
    /// Trailing window for the monthly rolling mean
    pub rolling_window: usize,
    /// Region a trip must start and end in to count toward hotspots
    pub hotspot_region: Region,
    /// Trips longer than this are left off the hotspot map
    pub max_hotspot_distance_km: f64,
    /// Width of a hotspot grid cell in degrees
    pub grid_resolution_deg: f64,
    /// Marker sample drawn for the map
    pub map_sample_size: usize,
    /// Origin-destination lines drawn from the marker sample
    pub route_line_sample_size: usize,
    pub sample_seed: u64,
    /// Mobility restriction period shaded on the trend chart
    pub restriction_period: Option<DateRange>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            rolling_window: 3,
            hotspot_region: Region::jabodetabek(),
            max_hotspot_distance_km: 60.0,
            grid_resolution_deg: 0.01,
            map_sample_size: 1200,
            route_line_sample_size: 400,
            sample_seed: 42,
            restriction_period: NaiveDate::from_ymd_opt(2021, 7, 1)
                .zip(NaiveDate::from_ymd_opt(2021, 8, 31))
                .map(|(start, end)| DateRange::new(start, end)),
        }
    }
}
