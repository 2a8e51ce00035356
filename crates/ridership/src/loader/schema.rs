//! Source columns and the coercion rules applied to each of them.
//!
//! Every fallback the loader applies is listed in [`RULES`]; the row parser
//! looks the rule up instead of patching values inline.

use std::collections::HashMap;

use csv::StringRecord;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::models::{Result, RidershipError};

/// Columns the loader understands, named by their header in the source file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Column {
    #[strum(serialize = "jumlah_penumpang")]
    Ridership,
    #[strum(serialize = "trayek")]
    Route,
    #[strum(serialize = "halte_awal")]
    OriginStop,
    #[strum(serialize = "halte_tujuan")]
    DestinationStop,
    #[strum(serialize = "date")]
    Date,
    #[strum(serialize = "year")]
    Year,
    #[strum(serialize = "month")]
    Month,
    #[strum(serialize = "latitude_awal")]
    OriginLat,
    #[strum(serialize = "longitude_awal")]
    OriginLon,
    #[strum(serialize = "latitude_tujuan")]
    DestinationLat,
    #[strum(serialize = "longitude_tujuan")]
    DestinationLon,
    #[strum(serialize = "distance_km")]
    Distance,
}

impl Column {
    pub fn header(self) -> &'static str {
        self.into()
    }

    pub const COORDINATES: [Column; 4] = [
        Column::OriginLat,
        Column::OriginLon,
        Column::DestinationLat,
        Column::DestinationLon,
    ];
}

/// Whether the schema must carry a column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// What a missing or unparseable cell turns into
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fallback {
    /// Substitute a fixed value
    Value(f64),
    /// Keep the row with the field undefined
    Missing,
    /// Discard the whole row
    DropRow,
}

#[derive(Clone, Copy, Debug)]
pub struct CoercionRule {
    pub column: Column,
    pub presence: Presence,
    pub fallback: Fallback,
}

const fn rule(column: Column, presence: Presence, fallback: Fallback) -> CoercionRule {
    CoercionRule { column, presence, fallback }
}

/// Largest ridership a single row may carry. Anything above is treated as
/// malformed and takes the column's fallback.
pub const MAX_RIDERSHIP: f64 = 1e9;

/// The full rule table. `date` and `year`/`month` are individually optional;
/// [`Schema::resolve`] requires one of the two forms.
pub const RULES: &[CoercionRule] = &[
    rule(Column::Ridership, Presence::Required, Fallback::Value(0.0)),
    rule(Column::Route, Presence::Required, Fallback::Missing),
    rule(Column::OriginStop, Presence::Required, Fallback::Missing),
    rule(Column::DestinationStop, Presence::Required, Fallback::Missing),
    rule(Column::Date, Presence::Optional, Fallback::DropRow),
    rule(Column::Year, Presence::Optional, Fallback::DropRow),
    rule(Column::Month, Presence::Optional, Fallback::Value(1.0)),
    rule(Column::OriginLat, Presence::Optional, Fallback::Missing),
    rule(Column::OriginLon, Presence::Optional, Fallback::Missing),
    rule(Column::DestinationLat, Presence::Optional, Fallback::Missing),
    rule(Column::DestinationLon, Presence::Optional, Fallback::Missing),
    rule(Column::Distance, Presence::Optional, Fallback::Missing),
];

pub fn rule_for(column: Column) -> &'static CoercionRule {
    RULES
        .iter()
        .find(|rule| rule.column == column)
        .unwrap_or_else(|| unreachable!("every column has a rule"))
}

/// Result of coercing one numeric cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coerced {
    Value(f64),
    Missing,
    DropRow,
}

/// How the month of each row is obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateSource {
    Direct,
    YearMonth,
}

/// Header positions of the recognised columns in one source file
#[derive(Clone, Debug)]
pub struct Schema {
    positions: HashMap<Column, usize>,
    date_source: DateSource,
}

impl Schema {
    /// Match headers against the rule table
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let positions: HashMap<Column, usize> = Column::iter()
            .filter_map(|column| {
                headers
                    .iter()
                    .position(|h| h.trim() == column.header())
                    .map(|pos| (column, pos))
            })
            .collect();

        if let Some(missing) = RULES
            .iter()
            .find(|rule| rule.presence == Presence::Required && !positions.contains_key(&rule.column))
        {
            return Err(RidershipError::MissingColumn(missing.column.header()));
        }

        let date_source = if positions.contains_key(&Column::Date) {
            DateSource::Direct
        } else if positions.contains_key(&Column::Year) && positions.contains_key(&Column::Month) {
            DateSource::YearMonth
        } else {
            return Err(RidershipError::MissingDateColumns);
        };

        Ok(Self { positions, date_source })
    }

    pub fn date_source(&self) -> DateSource {
        self.date_source
    }

    pub fn has(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// All four coordinate columns are present
    pub fn has_coordinates(&self) -> bool {
        Column::COORDINATES.iter().all(|c| self.has(*c))
    }

    /// Distances can be read or derived for this source
    pub fn has_distance(&self) -> bool {
        self.has(Column::Distance) || self.has_coordinates()
    }

    /// Trimmed, non-empty cell text
    pub fn text<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        let pos = *self.positions.get(&column)?;
        record.get(pos).map(str::trim).filter(|s| !s.is_empty() && !is_null_marker(s))
    }

    /// Numeric cell with the column's fallback applied
    pub fn number(&self, record: &StringRecord, column: Column) -> Coerced {
        match self.text(record, column).and_then(parse_number) {
            Some(value) => Coerced::Value(value),
            None => match rule_for(column).fallback {
                Fallback::Value(value) => Coerced::Value(value),
                Fallback::Missing => Coerced::Missing,
                Fallback::DropRow => Coerced::DropRow,
            },
        }
    }
}

fn is_null_marker(s: &str) -> bool {
    matches!(s, "NaN" | "nan" | "NA" | "N/A" | "null" | "NULL" | "None")
}

/// Lenient number parsing: finite floats only
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    const BASE: [&str; 4] = ["trayek", "halte_awal", "halte_tujuan", "jumlah_penumpang"];

    #[test]
    fn test_every_column_has_a_rule() {
        for column in Column::iter() {
            assert_eq!(rule_for(column).column, column);
        }
    }

    #[test]
    fn test_resolve_direct_date() {
        let mut names = BASE.to_vec();
        names.push("date");
        let schema = Schema::resolve(&headers(&names)).unwrap();
        assert_eq!(schema.date_source(), DateSource::Direct);
        assert!(!schema.has_distance());
    }

    #[test]
    fn test_resolve_year_month_with_coordinates() {
        let mut names = BASE.to_vec();
        names.extend(["year", "month", "latitude_awal", "longitude_awal", "latitude_tujuan", "longitude_tujuan"]);
        let schema = Schema::resolve(&headers(&names)).unwrap();
        assert_eq!(schema.date_source(), DateSource::YearMonth);
        assert!(schema.has_coordinates());
        assert!(schema.has_distance());
    }

    #[test]
    fn test_resolve_missing_date() {
        let mut names = BASE.to_vec();
        names.push("year");
        assert!(matches!(
            Schema::resolve(&headers(&names)),
            Err(RidershipError::MissingDateColumns)
        ));
    }

    #[test]
    fn test_resolve_missing_required() {
        let names = ["trayek", "halte_awal", "halte_tujuan", "date"];
        assert!(matches!(
            Schema::resolve(&headers(&names)),
            Err(RidershipError::MissingColumn("jumlah_penumpang"))
        ));
    }

    #[test]
    fn test_number_fallbacks() {
        let names = ["trayek", "halte_awal", "halte_tujuan", "jumlah_penumpang", "year", "month", "latitude_awal"];
        let schema = Schema::resolve(&headers(&names)).unwrap();
        let row = StringRecord::from(vec!["1", "A", "B", "abc", "", " ", "NaN"]);

        assert_eq!(schema.number(&row, Column::Ridership), Coerced::Value(0.0));
        assert_eq!(schema.number(&row, Column::Year), Coerced::DropRow);
        assert_eq!(schema.number(&row, Column::Month), Coerced::Value(1.0));
        assert_eq!(schema.number(&row, Column::OriginLat), Coerced::Missing);
        // Column absent from the schema falls back the same way
        assert_eq!(schema.number(&row, Column::Distance), Coerced::Missing);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number(" -6.25 "), Some(-6.25));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1,234"), None);
    }
}
