//! Grid-based density of trip origins inside the region of interest.

use std::collections::HashSet;

use geo::Point;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::dataset::View;
use crate::identifiers::StopIdentifier;
use crate::metrics::stats::quantile_sorted;
use crate::models::{InsufficientData, MetricResult, TripRecord};
use crate::spatial::{DensityGrid, GridCell};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum DensityLevel {
    #[strum(serialize = "very high")]
    VeryHigh,
    #[strum(serialize = "high")]
    High,
    #[strum(serialize = "moderate")]
    Moderate,
    #[strum(serialize = "low")]
    Low,
}

impl DensityLevel {
    pub fn classify(top_density: usize) -> Self {
        match top_density {
            d if d > 800 => Self::VeryHigh,
            d if d > 400 => Self::High,
            d if d > 150 => Self::Moderate,
            _ => Self::Low,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hotspots<'a> {
    /// Trips with both ends inside the region, short enough to map
    pub trips: Vec<&'a TripRecord>,
    /// Median of every origin and destination coordinate
    pub center: Point,
    pub densest_cell: Option<GridCell>,
    pub top_density: usize,
    pub density: DensityLevel,
    /// Distinct (name, coordinate) origin stops
    pub origin_stops: usize,
    pub destination_stops: usize,
}

/// Both endpoints of a trip, if known
fn endpoints(record: &TripRecord) -> Option<(Point, Point)> {
    Some((record.origin_location?, record.destination_location?))
}

fn distinct_stops<'a>(trips: &[&'a TripRecord], pick: impl Fn(&'a TripRecord) -> (Option<&'a StopIdentifier>, Option<Point>)) -> usize {
    trips
        .iter()
        .filter_map(|r| {
            let (stop, location) = pick(*r);
            let location = location?;
            Some((stop?, location.x().to_bits(), location.y().to_bits()))
        })
        .collect::<HashSet<_>>()
        .len()
}

pub fn hotspots<'a>(view: &View<'a>, config: &AnalysisConfig) -> MetricResult<Hotspots<'a>> {
    if view.is_empty() {
        return Err(InsufficientData::EmptyView);
    }

    let region = config.hotspot_region;
    // A table that carries distances only maps trips with a known, short one
    let within_reach = |r: &TripRecord| {
        !view.has_distance() || r.distance_km.is_some_and(|d| d <= config.max_hotspot_distance_km)
    };
    let trips: Vec<&'a TripRecord> = view
        .iter()
        .filter(|r| endpoints(r).is_some_and(|(o, d)| region.contains(o) && region.contains(d)))
        .filter(|&r| within_reach(r))
        .collect();

    if trips.is_empty() {
        return Err(InsufficientData::OutsideRegion);
    }

    let mut lats = Vec::with_capacity(trips.len() * 2);
    let mut lons = Vec::with_capacity(trips.len() * 2);
    let mut grid = DensityGrid::new(config.grid_resolution_deg);
    for (origin, destination) in trips.iter().filter_map(|r| endpoints(r)) {
        lats.extend([origin.y(), destination.y()]);
        lons.extend([origin.x(), destination.x()]);
        grid.insert(origin);
    }
    lats.sort_by(f64::total_cmp);
    lons.sort_by(f64::total_cmp);
    let center = Point::new(
        quantile_sorted(&lons, 0.5).ok_or(InsufficientData::OutsideRegion)?,
        quantile_sorted(&lats, 0.5).ok_or(InsufficientData::OutsideRegion)?,
    );

    let (densest_cell, top_density) = match grid.densest() {
        Some((cell, count)) => (Some(cell), count),
        None => (None, 0),
    };
    log::debug!(
        "Hotspot grid: {} trips over {} cells, densest holds {}",
        trips.len(),
        grid.occupied_cells(),
        top_density
    );

    let origin_stops = distinct_stops(&trips, |r| (r.origin.as_ref(), r.origin_location));
    let destination_stops = distinct_stops(&trips, |r| (r.destination.as_ref(), r.destination_location));

    Ok(Hotspots {
        trips,
        center,
        densest_cell,
        top_density,
        density: DensityLevel::classify(top_density),
        origin_stops,
        destination_stops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use chrono::NaiveDate;

    fn trip(origin: &str, from: (f64, f64), to: (f64, f64)) -> TripRecord {
        TripRecord::new("1", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), 1)
            .with_stops(origin, "Kota")
            .with_locations(from, to)
    }

    #[test]
    fn test_classify() {
        assert_eq!(DensityLevel::classify(801), DensityLevel::VeryHigh);
        assert_eq!(DensityLevel::classify(800), DensityLevel::High);
        assert_eq!(DensityLevel::classify(401), DensityLevel::High);
        assert_eq!(DensityLevel::classify(151), DensityLevel::Moderate);
        assert_eq!(DensityLevel::classify(150), DensityLevel::Low);
    }

    #[test]
    fn test_region_and_distance_restriction() {
        let mut no_destination = trip("Harmoni", (-6.2, 106.8), (-6.3, 106.9));
        no_destination.destination_location = None;

        let dataset = Dataset::from_records(
            "test.csv",
            vec![
                trip("Harmoni", (-6.201, 106.801), (-6.3, 106.9)),
                trip("Harmoni", (-6.201, 106.801), (-6.3, 106.9)),
                trip("Blok M", (-6.245, 106.799), (-6.1, 106.8)),
                // Destination in Bandung, outside the region
                trip("Harmoni", (-6.2, 106.8), (-6.9, 107.6)),
                // Both ends inside the box but more than 60 km apart
                trip("Far", (-7.7, 106.4), (-5.6, 107.2)),
                no_destination,
            ],
            true,
        );
        let view = dataset.view();
        let spots = hotspots(&view, &AnalysisConfig::default()).unwrap();

        assert_eq!(spots.trips.len(), 3);
        assert_eq!(spots.top_density, 2);
        assert_eq!(spots.densest_cell, Some(GridCell { lat: -620, lon: 10680 }));
        assert_eq!(spots.density, DensityLevel::Low);
        assert_eq!(spots.origin_stops, 2);
        // Same destination name, two different coordinates
        assert_eq!(spots.destination_stops, 2);
    }

    #[test]
    fn test_blank_source_distance_is_not_mapped() {
        let csv = "\
trayek,halte_awal,halte_tujuan,jumlah_penumpang,date,latitude_awal,longitude_awal,latitude_tujuan,longitude_tujuan,distance_km
1,Harmoni,Kota,10,2021-01-01,-6.2,106.8,-6.3,106.9,
1,Blok M,Kota,10,2021-01-01,-6.2,106.8,-6.3,106.9,5
";
        let dataset = crate::loader::load_from_reader(csv.as_bytes(), std::path::Path::new("test.csv")).unwrap();
        let spots = hotspots(&dataset.view(), &AnalysisConfig::default()).unwrap();

        assert_eq!(spots.trips.len(), 1);
        assert_eq!(spots.trips[0].origin.as_ref().unwrap().as_str(), "Blok M");
    }

    #[test]
    fn test_tables_without_distance_keep_every_trip() {
        let mut unmeasured = trip("Harmoni", (-6.2, 106.8), (-6.3, 106.9));
        unmeasured.distance_km = None;
        let dataset = Dataset::from_records("test.csv", vec![unmeasured], false);

        let spots = hotspots(&dataset.view(), &AnalysisConfig::default()).unwrap();
        assert_eq!(spots.trips.len(), 1);
    }

    #[test]
    fn test_center_is_median() {
        let dataset = Dataset::from_records(
            "test.csv",
            vec![trip("A", (-6.1, 106.7), (-6.3, 106.9)), trip("B", (-6.2, 106.8), (-6.4, 107.0))],
            true,
        );
        let spots = hotspots(&dataset.view(), &AnalysisConfig::default()).unwrap();
        // lats: -6.4 -6.3 -6.2 -6.1 ; lons: 106.7 106.8 106.9 107.0
        assert!((spots.center.y() - (-6.25)).abs() < 1e-9);
        assert!((spots.center.x() - 106.85).abs() < 1e-9);
    }

    #[test]
    fn test_outside_region() {
        let dataset = Dataset::from_records(
            "test.csv",
            vec![trip("Tugu", (-7.0, 110.4), (-7.1, 110.5))],
            true,
        );
        assert_eq!(hotspots(&dataset.view(), &AnalysisConfig::default()), Err(InsufficientData::OutsideRegion));
    }

    #[test]
    fn test_empty_view() {
        let dataset = Dataset::empty("test.csv");
        assert_eq!(hotspots(&dataset.view(), &AnalysisConfig::default()), Err(InsufficientData::EmptyView));
    }
}
