//! Box-plot summary of per-record ridership.

use serde::Serialize;

use crate::dataset::View;
use crate::metrics::stats::{mean, quantile_sorted, sample_std_dev};
use crate::models::{InsufficientData, MetricResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: Option<f64>,
    /// Tukey fences at 1.5 × IQR
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Records outside the fences
    pub outliers: usize,
}

impl DistributionSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

pub fn distribution(view: &View<'_>) -> MetricResult<DistributionSummary> {
    let mut values: Vec<f64> = view.iter().map(|r| r.ridership as f64).collect();
    if values.is_empty() {
        return Err(InsufficientData::EmptyView);
    }
    values.sort_by(f64::total_cmp);

    let q = |p: f64| quantile_sorted(&values, p).ok_or(InsufficientData::EmptyView);
    let (min, q1, median, q3, max) = (q(0.0)?, q(0.25)?, q(0.5)?, q(0.75)?, q(1.0)?);

    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let outliers = values.iter().filter(|v| **v < lower_fence || **v > upper_fence).count();

    Ok(DistributionSummary {
        count: values.len(),
        min,
        q1,
        median,
        q3,
        max,
        mean: mean(&values).ok_or(InsufficientData::EmptyView)?,
        std_dev: sample_std_dev(&values),
        lower_fence,
        upper_fence,
        outliers,
    })
}
