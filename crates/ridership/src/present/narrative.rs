//! Insight sentences under each view and the closing recommendations.
//!
//! A view without enough data gets the neutral notice from
//! [`InsufficientData`](crate::models::InsufficientData) instead.

use serde::Serialize;

use crate::metrics::{CorrelationSummary, DistributionSummary, Hotspots, RouteRank, StopRank, TrendDirection, TrendSummary};
use crate::models::MetricResult;
use crate::present::format::thousands;

/// How the narratives refer to the data shown
pub fn period_label(filter_active: bool) -> &'static str {
    if filter_active {
        "the selected period"
    } else {
        "2021"
    }
}

pub fn distribution_insight(summary: &MetricResult<DistributionSummary>) -> String {
    match summary {
        Ok(s) => format!(
            "Median ridership sits around {}. The upper quartile starts above {}, \
             so a minority of routes carries far more demand than the rest.",
            thousands(s.median as u64),
            thousands(s.q3 as u64),
        ),
        Err(e) => e.to_string(),
    }
}

pub fn trend_insight(trend: &MetricResult<TrendSummary>) -> String {
    let trend = match trend {
        Ok(t) => t,
        Err(e) => return e.to_string(),
    };
    let change = match (trend.direction(), trend.growth_pct) {
        (Some(TrendDirection::Up), Some(g)) => format!("up {:.1}%", g),
        (Some(TrendDirection::Down), Some(g)) => format!("down {:.1}%", g.abs()),
        (Some(TrendDirection::Flat), _) => "flat".to_string(),
        _ => return "Not enough months to compute a change over the period.".to_string(),
    };
    format!("Ridership over the selected months trends {change} from the first month to the last.")
}

pub fn ranking_insight(routes: &MetricResult<Vec<RouteRank>>, stops: &MetricResult<Vec<StopRank>>) -> String {
    let top_route = match routes {
        Ok(routes) => routes.first(),
        Err(e) => return e.to_string(),
    };
    let top_stop = stops.as_ref().ok().and_then(|s| s.first());
    match (top_route, top_stop) {
        (Some(route), Some(stop)) => format!(
            "Route {} has the highest demand with about {:.1}% of all riders. The busiest stop is {}.",
            route.route, route.share_pct, stop.stop
        ),
        (Some(route), None) => format!(
            "Route {} has the highest demand with about {:.1}% of all riders.",
            route.route, route.share_pct
        ),
        _ => "Not enough data to rank routes and stops.".to_string(),
    }
}

pub fn correlation_insight(correlation: &MetricResult<CorrelationSummary>) -> String {
    match correlation {
        Ok(c) => format!(
            "The relationship between route distance and ridership is {} (Pearson r = {:.2}). \
             Distance is not a dominant driver of ridership.",
            c.strength, c.pearson_r
        ),
        Err(e) => e.to_string(),
    }
}

pub fn hotspot_insight(hotspots: &MetricResult<Hotspots<'_>>) -> String {
    match hotspots {
        Ok(h) => format!(
            "There are {} origin stops and {} destination stops in this period. \
             Hotspot density is {}, with trips concentrated on a few main nodes \
             that are candidates for service upgrades or modal integration.",
            thousands(h.origin_stops as u64),
            thousands(h.destination_stops as u64),
            h.density
        ),
        Err(e) => e.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendations {
    pub findings: Vec<String>,
    /// Prioritized, most urgent first
    pub actions: Vec<String>,
}

pub fn recommendations(filter_active: bool) -> Recommendations {
    let period = period_label(filter_active);
    Recommendations {
        findings: vec![
            format!("Pareto effect: a small share of routes absorbs most passenger demand in {period}."),
            "Network resilience: ridership recovered strongly after the restriction phase.".to_string(),
            "Critical nodes: a few stops act as super hubs that shape trip quality.".to_string(),
            "Non-linear demand: route length does not track passenger volume.".to_string(),
        ],
        actions: vec![
            format!("Strengthen top routes: add fleet and cut headways on the routes carrying the most riders in {period}."),
            "Redesign main hubs: raise queue capacity, real-time information and modal integration at the busiest stops.".to_string(),
            "Right-size long routes: review long routes with a low load factor, guided by the distance correlation.".to_string(),
            "Monitor regularly: use this dashboard as an early warning for shifts in route or stop demand.".to_string(),
        ],
    }
}
