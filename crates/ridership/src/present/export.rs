//! CSV downloads for each derived view.
//!
//! Files are UTF-8, comma separated, with a header row taken from the row
//! struct. Nothing is written for a view that has no rows.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use crate::dataset::View;
use crate::metrics::{CorrelationSummary, DistributionSummary, RouteRank, StopRank, TrendSummary};
use crate::models::{Result, StopRole};

/// One downloadable table, named by its file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Export {
    #[strum(serialize = "ridership_distribution.csv")]
    Distribution,
    /// Per-record ridership the box plot is drawn from
    #[strum(serialize = "ridership_values.csv")]
    RidershipValues,
    #[strum(serialize = "monthly_trend.csv")]
    Trend,
    #[strum(serialize = "top10_routes.csv")]
    TopRoutes,
    #[strum(serialize = "popular_stops.csv")]
    TopStops,
    #[strum(serialize = "filtered_trips.csv")]
    FilteredTrips,
    #[strum(serialize = "distance_correlation.csv")]
    Correlation,
}

impl Export {
    pub fn file_name(self) -> &'static str {
        self.into()
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

fn write_rows<W, T, I>(writer: W, rows: I) -> Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct StatisticRow {
    statistic: &'static str,
    value: Option<f64>,
}

pub fn write_distribution<W: Write>(writer: W, summary: &DistributionSummary) -> Result<()> {
    let rows = [
        ("count", Some(summary.count as f64)),
        ("mean", Some(summary.mean)),
        ("std", summary.std_dev),
        ("min", Some(summary.min)),
        ("25%", Some(summary.q1)),
        ("50%", Some(summary.median)),
        ("75%", Some(summary.q3)),
        ("max", Some(summary.max)),
        ("lower_fence", Some(summary.lower_fence)),
        ("upper_fence", Some(summary.upper_fence)),
        ("outliers", Some(summary.outliers as f64)),
    ];
    write_rows(writer, rows.into_iter().map(|(statistic, value)| StatisticRow { statistic, value }))
}

#[derive(Serialize)]
struct RidershipRow {
    jumlah_penumpang: u64,
}

pub fn write_ridership_values<W: Write>(writer: W, view: &View<'_>) -> Result<()> {
    write_rows(
        writer,
        view.iter().map(|r| RidershipRow {
            jumlah_penumpang: r.ridership,
        }),
    )
}

#[derive(Serialize)]
struct TrendRow {
    month: String,
    ridership: u64,
    rolling_mean: f64,
}

pub fn write_trend<W: Write>(writer: W, trend: &TrendSummary) -> Result<()> {
    write_rows(
        writer,
        trend.points.iter().map(|p| TrendRow {
            month: p.month.format("%Y-%m").to_string(),
            ridership: p.ridership,
            rolling_mean: p.rolling_mean,
        }),
    )
}

#[derive(Serialize)]
struct RouteRow<'a> {
    rank: usize,
    route: &'a str,
    ridership: u64,
    share_pct: f64,
}

pub fn write_routes<W: Write>(writer: W, routes: &[RouteRank]) -> Result<()> {
    write_rows(
        writer,
        routes.iter().enumerate().map(|(i, r)| RouteRow {
            rank: i + 1,
            route: r.route.as_str(),
            ridership: r.ridership,
            share_pct: r.share_pct,
        }),
    )
}

#[derive(Serialize)]
struct StopRow<'a> {
    rank: usize,
    stop: &'a str,
    frequency: u64,
    role: StopRole,
}

pub fn write_stops<W: Write>(writer: W, stops: &[StopRank]) -> Result<()> {
    write_rows(
        writer,
        stops.iter().enumerate().map(|(i, s)| StopRow {
            rank: i + 1,
            stop: s.stop.as_str(),
            frequency: s.frequency,
            role: s.role,
        }),
    )
}

/// Filtered source rows, under the source column names
#[derive(Serialize)]
struct TripRow<'a> {
    trayek: Option<&'a str>,
    halte_awal: Option<&'a str>,
    halte_tujuan: Option<&'a str>,
    jumlah_penumpang: u64,
    date: String,
    latitude_awal: Option<f64>,
    longitude_awal: Option<f64>,
    latitude_tujuan: Option<f64>,
    longitude_tujuan: Option<f64>,
    distance_km: Option<f64>,
}

pub fn write_trips<W: Write>(writer: W, view: &View<'_>) -> Result<()> {
    write_rows(
        writer,
        view.iter().map(|r| TripRow {
            trayek: r.route.as_ref().map(|v| v.as_str()),
            halte_awal: r.origin.as_ref().map(|v| v.as_str()),
            halte_tujuan: r.destination.as_ref().map(|v| v.as_str()),
            jumlah_penumpang: r.ridership,
            date: r.month.to_string(),
            latitude_awal: r.origin_location.map(|p| p.y()),
            longitude_awal: r.origin_location.map(|p| p.x()),
            latitude_tujuan: r.destination_location.map(|p| p.y()),
            longitude_tujuan: r.destination_location.map(|p| p.x()),
            distance_km: r.distance_km,
        }),
    )
}

pub fn write_correlation<W: Write>(writer: W, correlation: &CorrelationSummary) -> Result<()> {
    write_rows(writer, correlation.points.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::metrics::{distribution, top_routes, trend};
    use crate::models::TripRecord;
    use chrono::NaiveDate;
    use strum::IntoEnumIterator;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, 1).unwrap()
    }

    fn dataset() -> Dataset {
        let records = vec![
            TripRecord::new("1", month(1), 100)
                .with_stops("Blok M", "Kota")
                .with_locations((-6.2, 106.8), (-6.3, 106.9)),
            TripRecord::new("1", month(2), 300).with_stops("Blok M", "Kota"),
        ];
        Dataset::from_records("test.csv", records, true)
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_file_names_are_distinct() {
        let names: std::collections::HashSet<_> = Export::iter().map(Export::file_name).collect();
        assert_eq!(names.len(), Export::iter().count());
        assert_eq!(Export::TopRoutes.file_name(), "top10_routes.csv");
        assert_eq!(
            Export::Trend.path_in(Path::new("exports")),
            PathBuf::from("exports/monthly_trend.csv")
        );
    }

    #[test]
    fn test_trend_csv() {
        let dataset = dataset();
        let summary = trend(&dataset.view(), 3).unwrap();
        let csv = render(|w| write_trend(w, &summary));
        assert_eq!(csv, "month,ridership,rolling_mean\n2021-01,100,100.0\n2021-02,300,200.0\n");
    }

    #[test]
    fn test_routes_csv() {
        let dataset = dataset();
        let routes = top_routes(&dataset.view(), 10).unwrap();
        let csv = render(|w| write_routes(w, &routes));
        assert_eq!(csv, "rank,route,ridership,share_pct\n1,1,400,100.0\n");
    }

    #[test]
    fn test_distribution_csv_marks_missing_std() {
        let dataset = Dataset::from_records("one.csv", vec![TripRecord::new("1", month(1), 7)], false);
        let summary = distribution(&dataset.view()).unwrap();
        let csv = render(|w| write_distribution(w, &summary));
        assert!(csv.starts_with("statistic,value\ncount,1.0\nmean,7.0\nstd,\n"));
    }

    #[test]
    fn test_ridership_values_csv() {
        let dataset = dataset();
        let csv = render(|w| write_ridership_values(w, &dataset.view()));
        assert_eq!(csv, "jumlah_penumpang\n100\n300\n");
    }

    #[test]
    fn test_trips_csv_uses_source_headers() {
        let dataset = dataset();
        let csv = render(|w| write_trips(w, &dataset.view()));
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("trayek,halte_awal,halte_tujuan,jumlah_penumpang,date,latitude_awal,longitude_awal,latitude_tujuan,longitude_tujuan,distance_km")
        );
        assert!(lines.next().unwrap().starts_with("1,Blok M,Kota,100,2021-01-01,-6.2,106.8,-6.3,106.9,"));
        assert_eq!(lines.next(), Some("1,Blok M,Kota,300,2021-02-01,,,,,"));
    }
}
