//! Top-N route and stop rankings.
//!
//! Ties keep the order in which groups first appear in the view.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::dataset::View;
use crate::identifiers::{RouteIdentifier, StopIdentifier};
use crate::models::{InsufficientData, MetricResult, StopRole};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteRank {
    pub route: RouteIdentifier,
    pub ridership: u64,
    /// Percent of the view's total ridership
    pub share_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopRank {
    pub stop: StopIdentifier,
    pub frequency: u64,
    pub role: StopRole,
}

/// Sum `weight` per key (saturating), then sort descending (stable, first-seen
/// order on ties)
fn ranked<K, I>(items: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, u64)> = Vec::new();
    for (key, weight) in items {
        match index.get(&key) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(weight),
            None => {
                index.insert(key.clone(), totals.len());
                totals.push((key, weight));
            }
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// Routes by summed ridership, with each route's share of the view total
pub fn top_routes(view: &View<'_>, n: usize) -> MetricResult<Vec<RouteRank>> {
    if view.is_empty() {
        return Err(InsufficientData::EmptyView);
    }
    let total = view.total_ridership();

    let routes = ranked(view.iter().filter_map(|r| Some((r.route.clone()?, r.ridership))));
    if routes.is_empty() {
        return Err(InsufficientData::EmptyView);
    }

    Ok(routes
        .into_iter()
        .take(n)
        .map(|(route, ridership)| RouteRank {
            route,
            ridership,
            share_pct: if total > 0 { ridership as f64 / total as f64 * 100.0 } else { 0.0 },
        })
        .collect())
}

/// Most frequent stops across both trip ends.
///
/// Origins and destinations are ranked separately, the two top lists are
/// merged (origins first), re-sorted by frequency and de-duplicated by stop
/// name. The first occurrence wins: the higher count, or the origin on a tie.
pub fn top_stops(view: &View<'_>, n: usize) -> MetricResult<Vec<StopRank>> {
    if view.is_empty() {
        return Err(InsufficientData::EmptyView);
    }

    let per_role = |role: StopRole| {
        let stops = view.iter().filter_map(|r| {
            let stop = match role {
                StopRole::Origin => r.origin.clone(),
                StopRole::Destination => r.destination.clone(),
            };
            Some((stop?, 1))
        });
        ranked(stops)
            .into_iter()
            .take(n)
            .map(move |(stop, frequency)| StopRank { stop, frequency, role })
    };

    let mut merged: Vec<StopRank> = per_role(StopRole::Origin).chain(per_role(StopRole::Destination)).collect();
    merged.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let mut seen = std::collections::HashSet::new();
    let stops: Vec<StopRank> = merged
        .into_iter()
        .filter(|s| seen.insert(s.stop.clone()))
        .take(n)
        .collect();

    if stops.is_empty() {
        return Err(InsufficientData::EmptyView);
    }
    Ok(stops)
}

/// Route with the highest total ridership
pub fn busiest_route(view: &View<'_>) -> Option<RouteIdentifier> {
    top_routes(view, 1).ok()?.into_iter().next().map(|r| r.route)
}

/// Most common origin stop; ties go to the alphabetically first name
pub fn most_frequent_origin(view: &View<'_>) -> Option<StopIdentifier> {
    let counts = ranked(view.iter().filter_map(|r| Some((r.origin.clone()?, 1))));
    let top = counts.first()?.1;
    counts
        .into_iter()
        .take_while(|(_, count)| *count == top)
        .map(|(stop, _)| stop)
        .min()
}
