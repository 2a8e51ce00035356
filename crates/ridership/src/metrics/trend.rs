//! Monthly ridership series with a trailing rolling mean.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::View;
use crate::metrics::stats::rolling_mean;
use crate::models::{InsufficientData, MetricResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: NaiveDate,
    pub ridership: u64,
    pub rolling_mean: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendSummary {
    /// Chronological, one point per month present in the view
    pub points: Vec<MonthlyPoint>,
    /// First-to-last change in percent. Undefined with fewer than two months
    /// or a zero first month.
    pub growth_pct: Option<f64>,
}

impl TrendSummary {
    pub fn direction(&self) -> Option<TrendDirection> {
        self.growth_pct.map(|g| {
            if g > 0.0 {
                TrendDirection::Up
            } else if g < 0.0 {
                TrendDirection::Down
            } else {
                TrendDirection::Flat
            }
        })
    }

    /// First month with the highest total
    pub fn peak(&self) -> Option<&MonthlyPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&MonthlyPoint>, p| match best {
                Some(b) if b.ridership >= p.ridership => Some(b),
                _ => Some(p),
            })
    }

    /// First month with the lowest total
    pub fn low(&self) -> Option<&MonthlyPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&MonthlyPoint>, p| match best {
                Some(b) if b.ridership <= p.ridership => Some(b),
                _ => Some(p),
            })
    }
}

/// Ridership summed per month, ascending
pub fn monthly_totals(view: &View<'_>) -> Vec<(NaiveDate, u64)> {
    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in view.iter() {
        let total = totals.entry(record.month).or_default();
        *total = total.saturating_add(record.ridership);
    }
    totals.into_iter().collect()
}

/// Percent change from `first` to `last`; a zero baseline has no growth rate
pub fn growth_pct(first: u64, last: u64) -> Option<f64> {
    (first > 0).then(|| (last as f64 - first as f64) / first as f64 * 100.0)
}

pub fn trend(view: &View<'_>, window: usize) -> MetricResult<TrendSummary> {
    let totals = monthly_totals(view);
    if totals.is_empty() {
        return Err(InsufficientData::EmptyView);
    }

    let values: Vec<f64> = totals.iter().map(|(_, v)| *v as f64).collect();
    let rolled = rolling_mean(&values, window);

    let growth = match (totals.first(), totals.last()) {
        (Some(first), Some(last)) if totals.len() >= 2 => growth_pct(first.1, last.1),
        _ => None,
    };
    if growth.is_none() && totals.len() >= 2 {
        log::debug!("Growth rate undefined: first month has zero ridership");
    }

    let points = totals
        .into_iter()
        .zip(rolled)
        .map(|((month, ridership), rolling_mean)| MonthlyPoint { month, ridership, rolling_mean })
        .collect();

    Ok(TrendSummary { points, growth_pct: growth })
}
