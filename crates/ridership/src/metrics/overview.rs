//! Headline KPIs for the summary view.

use std::collections::HashSet;

use serde::Serialize;

use crate::dataset::{Dataset, View, ViewFilter};
use crate::identifiers::{RouteIdentifier, StopIdentifier};
use crate::metrics::ranking::{busiest_route, most_frequent_origin};
use crate::metrics::stats::quantile_sorted;
use crate::metrics::trend::{trend, MonthlyPoint};
use crate::models::{InsufficientData, MetricResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overview {
    pub total_ridership: u64,
    pub active_routes: usize,
    /// Distinct origin stops plus distinct destination stops
    pub stops_used: usize,
    pub peak: MonthlyPoint,
    pub low: MonthlyPoint,
    /// Trough-to-peak change in percent; undefined for a zero trough
    pub recovery_pct: Option<f64>,
    pub median_ridership: f64,
}

pub fn overview(view: &View<'_>) -> MetricResult<Overview> {
    let monthly = trend(view, 1)?;
    let peak = monthly.peak().cloned().ok_or(InsufficientData::EmptyView)?;
    let low = monthly.low().cloned().ok_or(InsufficientData::EmptyView)?;

    let routes: HashSet<_> = view.iter().filter_map(|r| r.route.as_ref()).collect();
    let origins: HashSet<_> = view.iter().filter_map(|r| r.origin.as_ref()).collect();
    let destinations: HashSet<_> = view.iter().filter_map(|r| r.destination.as_ref()).collect();

    let mut values: Vec<f64> = view.iter().map(|r| r.ridership as f64).collect();
    values.sort_by(f64::total_cmp);

    Ok(Overview {
        total_ridership: view.total_ridership(),
        active_routes: routes.len(),
        stops_used: origins.len() + destinations.len(),
        recovery_pct: (low.ridership > 0)
            .then(|| (peak.ridership as f64 - low.ridership as f64) / low.ridership as f64 * 100.0),
        median_ridership: quantile_sorted(&values, 0.5).ok_or(InsufficientData::EmptyView)?,
        peak,
        low,
    })
}

/// Whole-year baseline next to the current selection
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Headline {
    pub filter_active: bool,
    pub selected_routes: Vec<RouteIdentifier>,
    pub global_top_route: Option<RouteIdentifier>,
    pub global_top_origin: Option<StopIdentifier>,
    pub filtered_top_route: Option<RouteIdentifier>,
    pub filtered_top_origin: Option<StopIdentifier>,
}

pub fn headline(dataset: &Dataset, filter: &ViewFilter, view: &View<'_>) -> Headline {
    let everything = dataset.view();
    Headline {
        filter_active: dataset.is_filter_active(filter),
        selected_routes: filter.routes.clone(),
        global_top_route: busiest_route(&everything),
        global_top_origin: most_frequent_origin(&everything),
        filtered_top_route: busiest_route(view),
        filtered_top_origin: most_frequent_origin(view),
    }
}
