//! Chart-ready payloads for an external plotting front end.
//!
//! Each builder only selects and renames fields from a metric summary and
//! attaches theme colours; the resulting structs serialize to plain JSON.

use serde::Serialize;

use crate::metrics::{CorrelationSummary, DistributionSummary, RouteRank, StopRank, TrendSummary};
use crate::models::{DateRange, StopRole};
use crate::present::format::{month_key, thousands};
use crate::present::theme::{css, ThemePalette};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartStyle {
    pub template: &'static str,
    pub background: String,
    pub plot_background: String,
    pub text: String,
    pub accent: String,
}

impl From<&ThemePalette> for ChartStyle {
    fn from(palette: &ThemePalette) -> Self {
        Self {
            template: palette.chart_template,
            background: css(palette.background),
            plot_background: css(palette.plot_background),
            text: css(palette.text),
            accent: css(palette.accent),
        }
    }
}

/// Horizontal marker drawn across a chart
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxPlotChart {
    pub title: &'static str,
    pub style: ChartStyle,
    pub summary: DistributionSummary,
    pub reference_lines: Vec<ReferenceLine>,
}

pub fn box_plot(summary: &DistributionSummary, palette: &ThemePalette) -> BoxPlotChart {
    BoxPlotChart {
        title: "Ridership per record",
        style: palette.into(),
        summary: summary.clone(),
        reference_lines: vec![
            ReferenceLine {
                label: format!("Median: {}", thousands(summary.median.round() as u64)),
                value: summary.median,
                color: css(palette.destination),
            },
            ReferenceLine {
                label: format!("Q3: {}", thousands(summary.q3.round() as u64)),
                value: summary.q3,
                color: css(palette.accent),
            },
        ],
    }
}

/// Shaded date interval behind a time series
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Band {
    pub label: &'static str,
    pub start: String,
    pub end: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendChart {
    pub title: &'static str,
    pub style: ChartStyle,
    pub months: Vec<String>,
    pub ridership: Vec<u64>,
    pub rolling_mean: Vec<f64>,
    pub rolling_color: String,
    pub band: Option<Band>,
}

/// Monthly totals and rolling mean. The restriction band is only attached
/// when it overlaps the months on the chart.
pub fn trend_chart(trend: &TrendSummary, restriction: Option<DateRange>, palette: &ThemePalette) -> TrendChart {
    let shown = DateRange::extent(trend.points.iter().map(|p| p.month));
    let band = match (restriction, shown) {
        (Some(period), Some(shown)) => period.clamp_to(&shown).map(|_| Band {
            label: "PPKM",
            start: period.start.to_string(),
            end: period.end.to_string(),
            color: css(palette.band),
        }),
        _ => None,
    };

    TrendChart {
        title: "Monthly ridership",
        style: palette.into(),
        months: trend.points.iter().map(|p| month_key(p.month)).collect(),
        ridership: trend.points.iter().map(|p| p.ridership).collect(),
        rolling_mean: trend.points.iter().map(|p| p.rolling_mean).collect(),
        rolling_color: css(palette.destination),
        band,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub style: ChartStyle,
    pub categories: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<String>,
    pub labels: Vec<String>,
}

pub fn route_bar(routes: &[RouteRank], palette: &ThemePalette) -> BarChart {
    BarChart {
        title: "Top routes by ridership",
        style: palette.into(),
        categories: routes.iter().map(|r| r.route.to_string()).collect(),
        values: routes.iter().map(|r| r.ridership).collect(),
        colors: vec![css(palette.accent); routes.len()],
        labels: routes.iter().map(|r| format!("{:.1}%", r.share_pct)).collect(),
    }
}

/// Stops coloured by whether they ranked as an origin or a destination
pub fn stop_bar(stops: &[StopRank], palette: &ThemePalette) -> BarChart {
    BarChart {
        title: "Most popular stops",
        style: palette.into(),
        categories: stops.iter().map(|s| s.stop.to_string()).collect(),
        values: stops.iter().map(|s| s.frequency).collect(),
        colors: stops
            .iter()
            .map(|s| match s.role {
                StopRole::Origin => css(palette.origin),
                StopRole::Destination => css(palette.destination),
            })
            .collect(),
        labels: stops.iter().map(|s| s.role.to_string()).collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: &'static str,
    pub style: ChartStyle,
    pub distance_km: Vec<f64>,
    pub ridership: Vec<u64>,
    pub marker_color: String,
    /// Endpoints of the OLS fit over the plotted distance range
    pub trendline: [(f64, f64); 2],
    pub annotation: String,
}

pub fn scatter(correlation: &CorrelationSummary, palette: &ThemePalette) -> ScatterChart {
    let (lo, hi) = correlation
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.distance_km), hi.max(p.distance_km))
        });
    let fit = |x: f64| correlation.slope * x + correlation.intercept;

    ScatterChart {
        title: "Distance vs ridership",
        style: palette.into(),
        distance_km: correlation.points.iter().map(|p| p.distance_km).collect(),
        ridership: correlation.points.iter().map(|p| p.ridership).collect(),
        marker_color: css(palette.marker),
        trendline: [(lo, fit(lo)), (hi, fit(hi))],
        annotation: format!(
            "r = {:.3} | R² = {:.3} | ρ = {:.3}",
            correlation.pearson_r, correlation.r_squared, correlation.spearman_rho
        ),
    }
}
