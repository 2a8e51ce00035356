//! Filter engine: date-range and route-set predicates over a dataset.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::identifiers::RouteIdentifier;
use crate::models::{DateRange, TripRecord};

/// User-selected restriction of the trip table.
///
/// `range: None` means the full data extent; an empty `routes` list means no
/// route restriction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub range: Option<DateRange>,
    /// Selected routes, in the order the user picked them
    pub routes: Vec<RouteIdentifier>,
}

impl ViewFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: Some(DateRange::new(start, end)),
            routes: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    /// Restrict to the given routes; duplicates are ignored
    pub fn with_routes<I, R>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RouteIdentifier>,
    {
        for route in routes {
            let route = route.into();
            if !self.routes.contains(&route) {
                self.routes.push(route);
            }
        }
        self
    }

    fn matcher(&self) -> impl Fn(&TripRecord) -> bool + '_ {
        let routes: HashSet<&RouteIdentifier> = self.routes.iter().collect();
        move |record: &TripRecord| {
            let in_range = self.range.map_or(true, |range| range.contains(record.month));
            let on_route = routes.is_empty()
                || record.route.as_ref().is_some_and(|route| routes.contains(route));
            in_range && on_route
        }
    }
}

/// Read-only subset of trip records, in table order
#[derive(Clone, Debug, PartialEq)]
pub struct View<'a> {
    records: Vec<&'a TripRecord>,
    has_distance: bool,
}

impl<'a> View<'a> {
    pub(crate) fn new(records: Vec<&'a TripRecord>, has_distance: bool) -> Self {
        Self { records, has_distance }
    }

    /// Narrow this view further. Filtering a view by the filter that
    /// produced it returns the same rows.
    pub fn filter(&self, filter: &ViewFilter) -> View<'a> {
        let matches = filter.matcher();
        View {
            records: self.records.iter().copied().filter(|r| matches(*r)).collect(),
            has_distance: self.has_distance,
        }
    }

    pub fn records(&self) -> &[&'a TripRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TripRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the underlying table can carry distances at all
    pub fn has_distance(&self) -> bool {
        self.has_distance
    }

    /// Saturates at `u64::MAX` instead of overflowing
    pub fn total_ridership(&self) -> u64 {
        self.iter().fold(0, |total, r| total.saturating_add(r.ridership))
    }
}
