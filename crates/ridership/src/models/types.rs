//! Core data types and errors for ridership data.

use std::path::PathBuf;

use chrono::NaiveDate;
use geo::Point;

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// One row of the source table: ridership on a route between two stops in a
/// given month.
///
/// Locations are `geo::Point`s with x = longitude, y = latitude.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRecord {
    pub route: Option<RouteIdentifier>,
    pub origin: Option<StopIdentifier>,
    pub destination: Option<StopIdentifier>,
    pub ridership: u64,
    pub month: NaiveDate,
    pub origin_location: Option<Point>,
    pub destination_location: Option<Point>,
    pub distance_km: Option<f64>,
}

impl TripRecord {
    /// Minimal record with no stops, locations or distance
    pub fn new(route: impl Into<RouteIdentifier>, month: NaiveDate, ridership: u64) -> Self {
        Self {
            route: Some(route.into()),
            origin: None,
            destination: None,
            ridership,
            month,
            origin_location: None,
            destination_location: None,
            distance_km: None,
        }
    }

    pub fn with_stops(mut self, origin: impl Into<StopIdentifier>, destination: impl Into<StopIdentifier>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }

    /// Attach both endpoints as (lat, lon) pairs and derive the distance
    pub fn with_locations(mut self, origin: (f64, f64), destination: (f64, f64)) -> Self {
        let origin = Point::new(origin.1, origin.0);
        let destination = Point::new(destination.1, destination.0);
        self.origin_location = Some(origin);
        self.destination_location = Some(destination);
        self.distance_km = Some(crate::spatial::haversine_km(origin, destination));
        self
    }

    /// Distance usable for statistics (present and finite)
    pub fn finite_distance(&self) -> Option<f64> {
        self.distance_km.filter(|d| d.is_finite())
    }
}

/// Which end of a trip a stop was counted for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, strum::Display)]
pub enum StopRole {
    #[strum(serialize = "origin")]
    #[serde(rename = "origin")]
    Origin,
    #[strum(serialize = "destination")]
    #[serde(rename = "destination")]
    Destination,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RidershipError {
    #[error("Data file '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(&'static str),

    #[error("Column 'date' / ('year', 'month') not found in dataset")]
    MissingDateColumns,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RidershipError>;

/// Why a statistic could not be produced for a view.
///
/// Shared by every aggregator so presentation code has one check to make. The
/// `Display` text is the neutral notice shown in place of the view.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InsufficientData {
    #[error("No data for this selection. Adjust the filters.")]
    EmptyView,

    #[error("Not enough valid data: needs at least {required} points, found {found}.")]
    TooFewPoints { required: usize, found: usize },

    #[error("Values do not vary enough to compute this statistic.")]
    ZeroVariance,

    #[error("Distance data is not available for this dataset.")]
    NoDistanceColumn,

    #[error("No coordinates inside the region of interest.")]
    OutsideRegion,
}

/// Outcome of every aggregator operation
pub type MetricResult<T> = std::result::Result<T, InsufficientData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builders() {
        let month = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let record = TripRecord::new("A", month, 100)
            .with_stops("Harmoni", "Blok M")
            .with_locations((-6.2, 106.8), (-6.3, 106.9));

        assert_eq!(record.route, Some(RouteIdentifier::new("A")));
        assert_eq!(record.origin_location.unwrap().y(), -6.2);
        assert_eq!(record.origin_location.unwrap().x(), 106.8);
        assert!(record.finite_distance().unwrap() > 0.0);
    }

    #[test]
    fn test_finite_distance_skips_nan() {
        let month = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let mut record = TripRecord::new("A", month, 1);
        record.distance_km = Some(f64::NAN);
        assert_eq!(record.finite_distance(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = RidershipError::SourceNotFound(PathBuf::from("df_final.csv"));
        assert_eq!(err.to_string(), "Data file 'df_final.csv' not found");

        let notice = InsufficientData::TooFewPoints { required: 2, found: 1 };
        assert!(notice.to_string().contains("at least 2"));
    }

    #[test]
    fn test_stop_role_display() {
        assert_eq!(StopRole::Origin.to_string(), "origin");
        assert_eq!(StopRole::Destination.to_string(), "destination");
    }
}
