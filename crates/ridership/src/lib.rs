//! # tj-ridership
//!
//! Ridership analytics over the TransJakarta 2021 trip table.
//!
//! ## Pipeline
//!
//! - **Loader**: reads the CSV table once per path, applies the column
//!   coercion rules and derives month and trip distance
//! - **Filter engine**: date range and route selection over borrowed rows
//! - **Metric aggregator**: KPIs, monthly trend, distribution, rankings,
//!   distance correlation and hotspot density
//! - **Presentation adapter**: chart payloads, GeoJSON map layers, CSV
//!   exports and narrative text, themed light or dark
//!
//! ## Example
//!
//! ```
//! use tj_ridership::prelude::*;
//! use chrono::NaiveDate;
//!
//! let jan = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//! let feb = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
//! let dataset = Dataset::from_records(
//!     "df_final.csv",
//!     vec![
//!         TripRecord::new("1", jan, 100).with_locations((-6.2, 106.8), (-6.3, 106.9)),
//!         TripRecord::new("1", feb, 300).with_locations((-6.2, 106.8), (-6.3, 106.9)),
//!     ],
//!     true,
//! );
//!
//! let summary = trend(&dataset.view(), 3).unwrap();
//! assert_eq!(summary.growth_pct, Some(200.0));
//!
//! let mut session = Session::default();
//! session.set_range(Some(DateRange::new(feb, feb)));
//! let report = session.render(&dataset);
//! assert_eq!(report.view.len(), 1);
//! ```

pub mod config;
pub mod dataset;
pub mod identifiers;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod present;
pub mod spatial;

pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::dataset::{Dataset, View, ViewFilter};
    pub use crate::identifiers::*;
    pub use crate::loader::{load, DatasetCache, FileSource, TableSource};
    pub use crate::metrics::*;
    pub use crate::models::*;
    pub use crate::present::{Export, Report, Session, Tab, Theme};
}

pub use prelude::*;
