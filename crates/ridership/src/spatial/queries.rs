//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula on a spherical Earth (radius 6371 km).

use geo::{coord, Point, Rect};

/// Mean Earth radius used for trip distances, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers.
///
/// Points are `x = longitude, y = latitude`, in degrees.
pub fn haversine_km(p1: Point, p2: Point) -> f64 {
    let (lat1, lon1) = (p1.y().to_radians(), p1.x().to_radians());
    let (lat2, lon2) = (p2.y().to_radians(), p2.x().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Distance between two optional endpoints; undefined if either is missing
/// or carries a non-finite coordinate.
pub fn distance_between(origin: Option<Point>, destination: Option<Point>) -> Option<f64> {
    let (origin, destination) = (origin?, destination?);
    let finite = |p: Point| p.x().is_finite() && p.y().is_finite();
    if !finite(origin) || !finite(destination) {
        return None;
    }
    Some(haversine_km(origin, destination))
}

/// Rectangular latitude/longitude window, bounds inclusive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    bounds: Rect,
}

impl Region {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            bounds: Rect::new(coord! { x: lon_min, y: lat_min }, coord! { x: lon_max, y: lat_max }),
        }
    }

    /// Greater Jakarta (Jabodetabek) window
    pub fn jabodetabek() -> Self {
        Self::new(-7.8, -5.5, 106.3, 107.3)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Check if a point lies inside the window (edges included)
    pub fn contains(&self, point: Point) -> bool {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        (min.y..=max.y).contains(&point.y()) && (min.x..=max.x).contains(&point.x())
    }
}
