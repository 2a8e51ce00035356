//! Session state and the render pass behind every interaction.
//!
//! Each interaction mutates the [`Session`] and calls [`Session::render`],
//! which filters the cached dataset and recomputes every view from scratch.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::json;
use strum::{Display, EnumIter};

use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, View, ViewFilter};
use crate::identifiers::RouteIdentifier;
use crate::metrics::{
    distance_correlation, distribution, headline, hotspots, overview, top_routes, top_stops, trend,
    CorrelationSummary, DistributionSummary, Headline, Hotspots, Overview, RouteRank, StopRank, TrendSummary,
};
use crate::models::{DateRange, MetricResult, Result};
use crate::present::charts;
use crate::present::export::{self, Export};
use crate::present::format::{month_label, percent, signed_percent, thousands, thousands_f64};
use crate::present::map::{hotspot_map, to_geojson_string};
use crate::present::narrative::{self, Recommendations};
use crate::present::theme::{Theme, ThemePalette};

/// Named sections of the dashboard, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display)]
pub enum Tab {
    #[strum(serialize = "Overview")]
    Overview,
    #[strum(serialize = "Trend & Distribution")]
    TrendDistribution,
    #[strum(serialize = "Routes & Spatial")]
    RoutesSpatial,
    #[strum(serialize = "Recommendations")]
    Recommendations,
}

/// Single-user session: the controls a user has set so far
#[derive(Clone, Debug, Default)]
pub struct Session {
    theme: Theme,
    filter: ViewFilter,
    config: AnalysisConfig,
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    /// `None` restores the full data extent
    pub fn set_range(&mut self, range: Option<DateRange>) {
        self.filter.range = range;
    }

    pub fn set_routes<I, R>(&mut self, routes: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<RouteIdentifier>,
    {
        self.filter = std::mem::take(&mut self.filter).with_routes(routes);
    }

    pub fn clear_filter(&mut self) {
        self.filter = ViewFilter::default();
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// One full pass: filter, then aggregate every view
    pub fn render<'a>(&self, dataset: &'a Dataset) -> Report<'a> {
        let view = dataset.filter(&self.filter);
        let filter_active = dataset.is_filter_active(&self.filter);
        log::debug!(
            "Rendering {} of {} records (filter active: {})",
            view.len(),
            dataset.len(),
            filter_active
        );

        Report {
            theme: self.theme,
            palette: self.theme.palette(),
            filter_active,
            range: self.filter.range.or(dataset.extent()),
            headline: headline(dataset, &self.filter, &view),
            overview: overview(&view),
            distribution: distribution(&view),
            trend: trend(&view, self.config.rolling_window),
            routes: top_routes(&view, self.config.top_n),
            stops: top_stops(&view, self.config.top_n),
            correlation: distance_correlation(&view),
            hotspots: hotspots(&view, &self.config),
            recommendations: narrative::recommendations(filter_active),
            config: self.config.clone(),
            view,
        }
    }
}

/// Everything one render pass produced. Each view carries its own
/// [`MetricResult`]; a failed view renders its notice and the rest still show.
pub struct Report<'a> {
    pub theme: Theme,
    pub palette: ThemePalette,
    pub filter_active: bool,
    /// Effective date range of the view
    pub range: Option<DateRange>,
    pub view: View<'a>,
    pub headline: Headline,
    pub overview: MetricResult<Overview>,
    pub distribution: MetricResult<DistributionSummary>,
    pub trend: MetricResult<TrendSummary>,
    pub routes: MetricResult<Vec<RouteRank>>,
    pub stops: MetricResult<Vec<StopRank>>,
    pub correlation: MetricResult<CorrelationSummary>,
    pub hotspots: MetricResult<Hotspots<'a>>,
    pub recommendations: Recommendations,
    config: AnalysisConfig,
}

fn payload<T, C: Serialize>(result: &MetricResult<T>, chart: impl FnOnce(&T) -> C) -> Result<serde_json::Value> {
    Ok(match result {
        Ok(value) => serde_json::to_value(chart(value))?,
        Err(e) => json!({ "notice": e.to_string() }),
    })
}

fn or_dash(value: Option<impl std::fmt::Display>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn date_label(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

impl Report<'_> {
    /// Chart payloads keyed by view; views without data carry a `notice`
    pub fn chart_payloads(&self) -> Result<serde_json::Value> {
        let palette = &self.palette;
        Ok(json!({
            "theme": self.theme,
            "distribution": payload(&self.distribution, |s| charts::box_plot(s, palette))?,
            "trend": payload(&self.trend, |t| charts::trend_chart(t, self.config.restriction_period, palette))?,
            "top_routes": payload(&self.routes, |r| charts::route_bar(r, palette))?,
            "top_stops": payload(&self.stops, |s| charts::stop_bar(s, palette))?,
            "correlation": payload(&self.correlation, |c| charts::scatter(c, palette))?,
        }))
    }

    pub fn map(&self) -> Option<FeatureCollection> {
        self.hotspots
            .as_ref()
            .ok()
            .map(|h| hotspot_map(h, &self.config, &self.palette))
    }

    /// Write every CSV export that has data, returning the files written
    pub fn write_exports(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        let mut write = |table: Export, f: &dyn Fn(File) -> Result<()>| -> Result<()> {
            let path = table.path_in(dir);
            f(File::create(&path)?)?;
            log::debug!("Wrote {}", path.display());
            written.push(path);
            Ok(())
        };

        if let Ok(s) = &self.distribution {
            write(Export::Distribution, &|file: File| export::write_distribution(file, s))?;
            write(Export::RidershipValues, &|file: File| export::write_ridership_values(file, &self.view))?;
        }
        if let Ok(t) = &self.trend {
            write(Export::Trend, &|file: File| export::write_trend(file, t))?;
        }
        if let Ok(r) = &self.routes {
            write(Export::TopRoutes, &|file: File| export::write_routes(file, r))?;
        }
        if let Ok(s) = &self.stops {
            write(Export::TopStops, &|file: File| export::write_stops(file, s))?;
        }
        if !self.view.is_empty() {
            write(Export::FilteredTrips, &|file: File| export::write_trips(file, &self.view))?;
        }
        if let Ok(c) = &self.correlation {
            write(Export::Correlation, &|file: File| export::write_correlation(file, c))?;
        }

        log::info!("Exported {} tables to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Chart payloads and the hotspot map as JSON files next to the CSVs
    pub fn write_payloads(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let charts = dir.join("charts.json");
        fs::write(&charts, serde_json::to_string_pretty(&self.chart_payloads()?)?)?;
        written.push(charts);

        if let Some(map) = self.map() {
            let path = dir.join("hotspot_map.geojson");
            fs::write(&path, to_geojson_string(map)?)?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn render_tab(&self, tab: Tab) -> String {
        let mut out = String::new();
        self.write_tab(tab, &mut out).expect("writing to a String cannot fail");
        out
    }

    /// Every tab, in order
    pub fn render_text(&self) -> String {
        use strum::IntoEnumIterator;
        Tab::iter().map(|tab| self.render_tab(tab)).collect::<Vec<_>>().join("\n")
    }

    fn write_tab(&self, tab: Tab, out: &mut String) -> std::fmt::Result {
        writeln!(out, "== {tab} ==")?;
        match tab {
            Tab::Overview => self.write_overview(out),
            Tab::TrendDistribution => self.write_trend_distribution(out),
            Tab::RoutesSpatial => self.write_routes_spatial(out),
            Tab::Recommendations => self.write_recommendations(out),
        }
    }

    fn write_overview(&self, out: &mut String) -> std::fmt::Result {
        let period = match self.range {
            Some(r) => format!("{} - {}", date_label(r.start), date_label(r.end)),
            None => "-".to_string(),
        };
        writeln!(out, "Period: {period}")?;
        writeln!(out, "Theme: {}", self.theme)?;

        match &self.overview {
            Ok(o) => {
                writeln!(out, "Total ridership: {}", thousands(o.total_ridership))?;
                writeln!(out, "Active routes: {}", thousands(o.active_routes as u64))?;
                writeln!(out, "Stops used: {}", thousands(o.stops_used as u64))?;
                writeln!(out, "Peak month: {} ({})", month_label(o.peak.month), thousands(o.peak.ridership))?;
                writeln!(out, "Lowest month: {} ({})", month_label(o.low.month), thousands(o.low.ridership))?;
                writeln!(out, "Recovery: {}", signed_percent(o.recovery_pct))?;
                writeln!(out, "Median ridership per record: {}", thousands_f64(o.median_ridership))?;
            }
            Err(e) => writeln!(out, "{e}")?,
        }

        let h = &self.headline;
        writeln!(out)?;
        writeln!(out, "Filter: {}", if h.filter_active { "active" } else { "off" })?;
        if !h.selected_routes.is_empty() {
            let routes: Vec<&str> = h.selected_routes.iter().map(|r| r.as_str()).collect();
            writeln!(out, "Selected routes: {}", routes.join(", "))?;
        }
        writeln!(
            out,
            "Busiest route: {} (2021) | {} (filtered)",
            or_dash(h.global_top_route.as_ref()),
            or_dash(h.filtered_top_route.as_ref())
        )?;
        writeln!(
            out,
            "Most frequent origin: {} (2021) | {} (filtered)",
            or_dash(h.global_top_origin.as_ref()),
            or_dash(h.filtered_top_origin.as_ref())
        )
    }

    fn write_trend_distribution(&self, out: &mut String) -> std::fmt::Result {
        if let Ok(t) = &self.trend {
            for p in &t.points {
                writeln!(
                    out,
                    "  {:<9} {:>14}  rolling {:>14}",
                    month_label(p.month),
                    thousands(p.ridership),
                    thousands_f64(p.rolling_mean)
                )?;
            }
        }
        writeln!(out, "Insight: {}", narrative::trend_insight(&self.trend))?;

        if let Ok(s) = &self.distribution {
            writeln!(
                out,
                "Distribution: min {} | Q1 {} | median {} | Q3 {} | max {} | outliers {}",
                thousands_f64(s.min),
                thousands_f64(s.q1),
                thousands_f64(s.median),
                thousands_f64(s.q3),
                thousands_f64(s.max),
                thousands(s.outliers as u64)
            )?;
        }
        writeln!(out, "Insight: {}", narrative::distribution_insight(&self.distribution))
    }

    fn write_routes_spatial(&self, out: &mut String) -> std::fmt::Result {
        if let Ok(routes) = &self.routes {
            writeln!(out, "Top routes:")?;
            for (i, r) in routes.iter().enumerate() {
                writeln!(out, "  {:>2}. {:<12} {:>14} ({})", i + 1, r.route, thousands(r.ridership), percent(r.share_pct))?;
            }
        }
        if let Ok(stops) = &self.stops {
            writeln!(out, "Popular stops:")?;
            for (i, s) in stops.iter().enumerate() {
                writeln!(out, "  {:>2}. {:<28} {:>10} {}", i + 1, s.stop, thousands(s.frequency), s.role)?;
            }
        }
        writeln!(out, "Insight: {}", narrative::ranking_insight(&self.routes, &self.stops))?;
        writeln!(out, "Correlation: {}", narrative::correlation_insight(&self.correlation))?;
        writeln!(out, "Hotspots: {}", narrative::hotspot_insight(&self.hotspots))
    }

    fn write_recommendations(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Key findings:")?;
        for finding in &self.recommendations.findings {
            writeln!(out, "  * {finding}")?;
        }
        writeln!(out, "Priority actions:")?;
        for (i, action) in self.recommendations.actions.iter().enumerate() {
            writeln!(out, "  {}. {action}", i + 1)?;
        }
        Ok(())
    }
}
