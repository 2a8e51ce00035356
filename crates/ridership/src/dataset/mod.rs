//! The canonical in-memory trip table.
//!
//! A `Dataset` is built once per source path and never mutated afterwards.
//! Every interaction derives a fresh [`View`] from it.

pub mod view;

use std::path::{Path, PathBuf};

use crate::identifiers::RouteIdentifier;
use crate::models::{DateRange, TripRecord};

pub use view::{View, ViewFilter};

#[derive(Clone, Debug)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<TripRecord>,
    has_distance: bool,
    dropped_rows: usize,
    extent: Option<DateRange>,
    routes: Vec<RouteIdentifier>,
}

impl Dataset {
    /// Build a dataset from already-coerced records.
    ///
    /// `has_distance` records whether the source carried enough columns to
    /// derive a distance at all, independent of per-row availability.
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<TripRecord>, has_distance: bool) -> Self {
        let extent = DateRange::extent(records.iter().map(|r| r.month));

        let mut routes: Vec<RouteIdentifier> = records.iter().filter_map(|r| r.route.clone()).collect();
        routes.sort();
        routes.dedup();

        Self {
            source: source.into(),
            records,
            has_distance,
            dropped_rows: 0,
            extent,
            routes,
        }
    }

    /// The "cannot render" table
    pub fn empty(source: impl Into<PathBuf>) -> Self {
        Self::from_records(source, Vec::new(), false)
    }

    pub(crate) fn with_dropped_rows(mut self, dropped: usize) -> Self {
        self.dropped_rows = dropped;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_distance(&self) -> bool {
        self.has_distance
    }

    /// Rows discarded while loading (no resolvable month)
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// First and last month present, `None` for an empty table
    pub fn extent(&self) -> Option<DateRange> {
        self.extent
    }

    /// Distinct routes, sorted
    pub fn routes(&self) -> &[RouteIdentifier] {
        &self.routes
    }

    /// Unfiltered view over every record
    pub fn view(&self) -> View<'_> {
        View::new(self.records.iter().collect(), self.has_distance)
    }

    /// Apply a filter to the whole table
    pub fn filter(&self, filter: &ViewFilter) -> View<'_> {
        self.view().filter(filter)
    }

    /// True iff the filter narrows the date range below the data extent or
    /// restricts routes. Display only; filtering never consults it.
    pub fn is_filter_active(&self, filter: &ViewFilter) -> bool {
        let narrowed = match (filter.range, self.extent) {
            (Some(range), Some(extent)) => range != extent,
            (Some(_), None) => true,
            (None, _) => false,
        };
        narrowed || !filter.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, 1).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_records(
            "test.csv",
            vec![
                TripRecord::new("9", month(3), 10),
                TripRecord::new("1", month(1), 20),
                TripRecord::new("9", month(6), 30),
            ],
            false,
        )
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::empty("missing.csv");
        assert!(dataset.is_empty());
        assert!(dataset.extent().is_none());
        assert!(dataset.view().is_empty());
    }

    #[test]
    fn test_extent_and_routes() {
        let dataset = sample();
        assert_eq!(dataset.extent(), Some(DateRange::new(month(1), month(6))));
        let routes: Vec<_> = dataset.routes().iter().map(|r| r.as_str()).collect();
        assert_eq!(routes, vec!["1", "9"]);
    }

    #[test]
    fn test_filter_active_flag() {
        let dataset = sample();

        assert!(!dataset.is_filter_active(&ViewFilter::default()));
        assert!(!dataset.is_filter_active(&ViewFilter::between(month(1), month(6))));
        assert!(dataset.is_filter_active(&ViewFilter::between(month(2), month(6))));
        assert!(dataset.is_filter_active(&ViewFilter::default().with_routes(["9"])));
    }
}
