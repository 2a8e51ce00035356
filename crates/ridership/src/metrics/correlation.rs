//! Distance versus ridership correlation.

use serde::Serialize;

use crate::dataset::View;
use crate::metrics::stats::{linear_fit, pearson, spearman};
use crate::models::{InsufficientData, MetricResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    #[strum(serialize = "very weak")]
    VeryWeak,
    #[strum(serialize = "weak")]
    Weak,
    #[strum(serialize = "moderate")]
    Moderate,
    #[strum(serialize = "strong")]
    Strong,
}

impl Strength {
    pub fn classify(r: f64) -> Self {
        match r.abs() {
            a if a < 0.2 => Self::VeryWeak,
            a if a < 0.4 => Self::Weak,
            a if a < 0.6 => Self::Moderate,
            _ => Self::Strong,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DistancePoint {
    pub distance_km: f64,
    pub ridership: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationSummary {
    /// Rows with a finite distance
    pub points: Vec<DistancePoint>,
    pub pearson_r: f64,
    pub r_squared: f64,
    pub spearman_rho: f64,
    pub strength: Strength,
    /// OLS trendline for the scatter
    pub slope: f64,
    pub intercept: f64,
}

/// Minimum valid rows for any coefficient
pub const MIN_POINTS: usize = 2;

pub fn distance_correlation(view: &View<'_>) -> MetricResult<CorrelationSummary> {
    if view.is_empty() {
        return Err(InsufficientData::EmptyView);
    }
    if !view.has_distance() {
        return Err(InsufficientData::NoDistanceColumn);
    }

    let points: Vec<DistancePoint> = view
        .iter()
        .filter_map(|r| {
            Some(DistancePoint {
                distance_km: r.finite_distance()?,
                ridership: r.ridership,
            })
        })
        .collect();

    if points.len() < MIN_POINTS {
        return Err(InsufficientData::TooFewPoints {
            required: MIN_POINTS,
            found: points.len(),
        });
    }

    let xs: Vec<f64> = points.iter().map(|p| p.distance_km).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.ridership as f64).collect();

    let pearson_r = pearson(&xs, &ys).ok_or(InsufficientData::ZeroVariance)?;
    let spearman_rho = spearman(&xs, &ys).ok_or(InsufficientData::ZeroVariance)?;
    let (slope, intercept) = linear_fit(&xs, &ys).ok_or(InsufficientData::ZeroVariance)?;

    Ok(CorrelationSummary {
        points,
        pearson_r,
        r_squared: pearson_r * pearson_r,
        spearman_rho,
        strength: Strength::classify(pearson_r),
        slope,
        intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::models::TripRecord;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn trip(distance: Option<f64>, ridership: u64) -> TripRecord {
        let mut record = TripRecord::new("1", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), ridership);
        record.distance_km = distance;
        record
    }

    #[test]
    fn test_classify() {
        assert_eq!(Strength::classify(0.1), Strength::VeryWeak);
        assert_eq!(Strength::classify(-0.3), Strength::Weak);
        assert_eq!(Strength::classify(0.59), Strength::Moderate);
        assert_eq!(Strength::classify(-0.6), Strength::Strong);
        assert_eq!(Strength::VeryWeak.to_string(), "very weak");
    }

    #[test]
    fn test_correlation_bounds() {
        let dataset = Dataset::from_records(
            "test.csv",
            vec![trip(Some(1.0), 10), trip(Some(2.0), 40), trip(Some(3.0), 20), trip(Some(8.0), 90)],
            true,
        );
        let summary = distance_correlation(&dataset.view()).unwrap();

        assert!((-1.0..=1.0).contains(&summary.pearson_r));
        assert!((-1.0..=1.0).contains(&summary.spearman_rho));
        assert_relative_eq!(summary.r_squared, summary.pearson_r.powi(2));
        assert_relative_eq!(summary.spearman_rho, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_distance_excluded() {
        let dataset = Dataset::from_records(
            "test.csv",
            vec![trip(Some(1.0), 10), trip(None, 1000), trip(Some(2.0), 20), trip(Some(f64::NAN), 5)],
            true,
        );
        let view = dataset.view();
        let summary = distance_correlation(&view).unwrap();

        assert_eq!(summary.points.len(), 2);
        assert_relative_eq!(summary.pearson_r, 1.0, epsilon = 1e-12);
        // Excluded rows still count toward totals
        assert_eq!(view.total_ridership(), 1035);
    }

    #[test]
    fn test_degenerate_inputs() {
        let one = Dataset::from_records("test.csv", vec![trip(Some(1.0), 10), trip(None, 3)], true);
        assert_eq!(
            distance_correlation(&one.view()),
            Err(InsufficientData::TooFewPoints { required: 2, found: 1 })
        );

        let flat = Dataset::from_records("test.csv", vec![trip(Some(1.0), 10), trip(Some(2.0), 10)], true);
        assert_eq!(distance_correlation(&flat.view()), Err(InsufficientData::ZeroVariance));

        let no_column = Dataset::from_records("test.csv", vec![trip(None, 1)], false);
        assert_eq!(distance_correlation(&no_column.view()), Err(InsufficientData::NoDistanceColumn));

        let empty = Dataset::empty("test.csv");
        assert_eq!(distance_correlation(&empty.view()), Err(InsufficientData::EmptyView));
    }
}
