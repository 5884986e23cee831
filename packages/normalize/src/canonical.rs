//! Conversion from the cleaned working table into typed records.

use chrono::{Datelike as _, Timelike as _};
use crime_dash_report_models::{CanonicalTable, CrimeRecord, DayOfWeek, Table};

use crate::options::ColumnNames;
use crate::passes::{calendar_keys, parse_int, parse_occurred_at, shooting_flag};
use crate::text::is_intersection;
use crate::{INTERSECTION_COLUMN, NormalizeError, OCCURRED_AT_COLUMN};

/// Reads one row at a time, naming the column in every error.
struct RowReader<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowReader<'a> {
    fn optional(&self, column: &str) -> Option<&'a str> {
        self.table.value(self.row, column)
    }

    fn text(&self, column: &str) -> Result<String, NormalizeError> {
        self.optional(column)
            .map(ToOwned::to_owned)
            .ok_or_else(|| NormalizeError::NullValue {
                column: column.to_owned(),
                row: self.row,
            })
    }

    fn float(&self, column: &str) -> Result<f64, NormalizeError> {
        self.optional_float(column)?
            .ok_or_else(|| NormalizeError::NullValue {
                column: column.to_owned(),
                row: self.row,
            })
    }

    fn optional_float(&self, column: &str) -> Result<Option<f64>, NormalizeError> {
        self.optional(column)
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|e| NormalizeError::parse(column, raw, e))
            })
            .transpose()
    }
}

/// Converts a cleaned table into a [`CanonicalTable`].
///
/// Columns derived by the time and street passes are read when present
/// and computed from their inputs otherwise.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if a required column is
/// absent, [`NormalizeError::NullValue`] if a required cell is null, and
/// [`NormalizeError::Parse`] or [`NormalizeError::Domain`] if a cell
/// cannot be interpreted.
pub fn to_canonical(table: &Table, columns: &ColumnNames) -> Result<CanonicalTable, NormalizeError> {
    for name in [
        &columns.incident_id,
        &columns.offense_code,
        &columns.category,
        &columns.district,
        &columns.street,
        &columns.latitude,
        &columns.longitude,
        &columns.year,
        &columns.month,
    ] {
        if !table.has_column(name) {
            return Err(NormalizeError::MissingColumn { name: name.clone() });
        }
    }

    let timestamp_column = if table.has_column(OCCURRED_AT_COLUMN) {
        OCCURRED_AT_COLUMN
    } else if table.has_column(&columns.occurred_on) {
        columns.occurred_on.as_str()
    } else {
        return Err(NormalizeError::MissingColumn {
            name: OCCURRED_AT_COLUMN.to_owned(),
        });
    };

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let reader = RowReader { table, row };

        let occurred_at = parse_occurred_at(timestamp_column, reader.optional(timestamp_column))?;
        let year: i32 = parse_int(&columns.year, reader.optional(&columns.year))?;
        let month: u32 = parse_int(&columns.month, reader.optional(&columns.month))?;
        let (month_year, day_month_year) = calendar_keys(year, month, occurred_at.day())?;

        let day_of_week = match reader.optional(&columns.day_of_week) {
            Some(name) => name
                .trim()
                .parse::<DayOfWeek>()
                .map_err(|e| NormalizeError::parse(&columns.day_of_week, name, e))?,
            None => DayOfWeek::from(occurred_at.weekday()),
        };
        let hour = match reader.optional(&columns.hour) {
            Some(raw) => parse_int(&columns.hour, Some(raw))?,
            None => occurred_at.hour(),
        };

        let raw_shooting = reader.optional(&columns.shooting);
        let shooting = shooting_flag(raw_shooting).ok_or_else(|| NormalizeError::Domain {
            column: columns.shooting.clone(),
            value: raw_shooting.unwrap_or_default().to_owned(),
        })?;

        let street = reader.text(&columns.street)?;
        let intersection = reader
            .optional(INTERSECTION_COLUMN)
            .map_or_else(|| is_intersection(&street), |flag| flag == "true");

        records.push(CrimeRecord {
            incident_id: reader.text(&columns.incident_id)?,
            offense_category: reader.text(&columns.category)?,
            offense_code: reader.text(&columns.offense_code)?,
            offense_description: reader.optional(&columns.description).map(ToOwned::to_owned),
            district: reader.text(&columns.district)?,
            street,
            intersection,
            latitude: reader.float(&columns.latitude)?,
            longitude: reader.optional_float(&columns.longitude)?,
            occurred_at,
            year,
            month,
            day_of_week,
            hour,
            month_year,
            day_month_year,
            shooting,
        });
    }

    Ok(CanonicalTable::new(records))
}
