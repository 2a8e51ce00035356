//! Dataset loader: reads the trip table, coerces types and synthesizes the
//! month and distance fields.
//!
//! ## Row pipeline
//!
//! 1. Resolve the header row into a [`Schema`] (fails on missing columns)
//! 2. Coerce each cell according to [`schema::RULES`]
//! 3. Resolve the month; rows without one are dropped
//! 4. Take `distance_km` from the source, or derive it from the coordinates

pub mod cache;
pub mod schema;
pub mod source;

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use geo::Point;

use crate::dataset::Dataset;
use crate::identifiers::Interner;
use crate::models::{from_year_month, parse_month, Result, RidershipError, TripRecord};
use crate::spatial::distance_between;

pub use cache::DatasetCache;
pub use schema::{Column, Schema};
pub use source::{FileSource, TableSource};

/// Load a dataset through a [`TableSource`].
///
/// A missing source is reported as [`RidershipError::SourceNotFound`]; callers
/// treat that as "cannot render" rather than a crash.
pub fn load(source: &dyn TableSource, path: &Path) -> Result<Dataset> {
    if !source.exists(path) {
        return Err(RidershipError::SourceNotFound(path.to_path_buf()));
    }
    let reader = source.open(path)?;
    load_from_reader(reader, path)
}

/// Parse a CSV trip table from any reader
pub fn load_from_reader<R: Read>(reader: R, path: &Path) -> Result<Dataset> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let schema = Schema::resolve(csv.headers()?)?;
    let mut interner = Interner::default();

    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut record = StringRecord::new();
    while csv.read_record(&mut record)? {
        match parse_row(&schema, &record, &mut interner) {
            Some(trip) => records.push(trip),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("Dropped {} rows without a resolvable month from {}", dropped, path.display());
    }
    log::info!("Loaded {} trip records from {}", records.len(), path.display());

    Ok(Dataset::from_records(path, records, schema.has_distance()).with_dropped_rows(dropped))
}

fn parse_row(schema: &Schema, record: &StringRecord, interner: &mut Interner) -> Option<TripRecord> {
    use schema::Coerced;

    let month = match schema.date_source() {
        schema::DateSource::Direct => schema.text(record, Column::Date).and_then(parse_month),
        schema::DateSource::YearMonth => {
            let year = match schema.number(record, Column::Year) {
                Coerced::Value(v) => v.trunc() as i32,
                Coerced::Missing | Coerced::DropRow => return None,
            };
            let month = match schema.number(record, Column::Month) {
                Coerced::Value(v) if v >= 0.0 => v.trunc() as u32,
                _ => return None,
            };
            from_year_month(year, month)
        }
    }?;

    let ridership = match schema.number(record, Column::Ridership) {
        Coerced::Value(v) if v > 0.0 && v <= schema::MAX_RIDERSHIP => v.trunc() as u64,
        _ => 0,
    };

    let point = |lat: Column, lon: Column| match (schema.number(record, lat), schema.number(record, lon)) {
        (Coerced::Value(lat), Coerced::Value(lon)) => Some(Point::new(lon, lat)),
        _ => None,
    };
    let origin_location = point(Column::OriginLat, Column::OriginLon);
    let destination_location = point(Column::DestinationLat, Column::DestinationLon);

    let distance_km = if schema.has(Column::Distance) {
        match schema.number(record, Column::Distance) {
            Coerced::Value(v) => Some(v),
            _ => None,
        }
    } else if schema.has_coordinates() {
        distance_between(origin_location, destination_location)
    } else {
        None
    };

    Some(TripRecord {
        route: schema.text(record, Column::Route).map(|s| interner.route(s)),
        origin: schema.text(record, Column::OriginStop).map(|s| interner.stop(s)),
        destination: schema.text(record, Column::DestinationStop).map(|s| interner.stop(s)),
        ridership,
        month,
        origin_location,
        destination_location,
        distance_km,
    })
}
