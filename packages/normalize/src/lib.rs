#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaning passes that turn raw incident exports into the canonical table.
//!
//! [`normalize`] runs the passes over the whole working table in a fixed
//! order:
//!
//! 1. lowercase column headers
//! 2. drop rows at or below the latitude floor
//! 3. map the shooting indicator onto `0`/`1`
//! 4. title-case the configured text columns
//! 5. rebuild categories from offense codes
//! 6. drop rows with nulls in required columns
//! 7. parse timestamps and derive the month/day keys
//! 8. prune columns
//! 9. cut street text at the first line break and flag intersections
//!
//! Any failure aborts the run and no table is returned. [`clean`] follows
//! the passes with the conversion into a typed [`CanonicalTable`].

pub mod canonical;
pub mod options;
pub mod passes;
pub mod text;
pub mod time;

use crime_dash_report_models::{CanonicalTable, Table};

pub use options::{CleaningOptions, ColumnNames, parse_cleaning_toml};

/// Column holding the parsed occurrence timestamp.
pub const OCCURRED_AT_COLUMN: &str = "occurred_at";
/// Column holding the first day of the reporting month.
pub const MONTH_YEAR_COLUMN: &str = "month_year";
/// Column holding the reporting date.
pub const DAY_MONTH_YEAR_COLUMN: &str = "day_month_year";
/// Column flagging junction streets.
pub const INTERSECTION_COLUMN: &str = "intersection";

/// Errors that can occur while normalizing.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// A value fell outside the column's enumerated domain.
    #[error("Unrecognized value '{value}' in column '{column}'")]
    Domain {
        /// Column being standardized.
        column: String,
        /// The offending raw value.
        value: String,
    },

    /// A value could not be parsed.
    #[error("Failed to parse '{value}' in column '{column}': {reason}")]
    Parse {
        /// Column being parsed.
        column: String,
        /// The offending raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A column the configuration refers to is not in the table.
    #[error("Missing column '{name}'")]
    MissingColumn {
        /// Name of the absent column.
        name: String,
    },

    /// A required cell is null.
    #[error("Null value in required column '{column}' at row {row}")]
    NullValue {
        /// Column that must be non-null.
        column: String,
        /// Zero-based row index.
        row: usize,
    },

    /// The cleaning configuration is malformed.
    #[error("Invalid cleaning config: {0}")]
    Config(#[from] toml::de::Error),
}

impl NormalizeError {
    pub(crate) fn parse(column: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            column: column.to_owned(),
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

fn log_pass(name: &str, before: usize, table: &Table) {
    log::debug!("{name}: {before} -> {} rows", table.len());
}

/// Runs every enabled cleaning pass, in order.
///
/// Running it again on its own output with the same options returns an
/// identical table.
///
/// # Errors
///
/// Returns the first [`NormalizeError`] raised by any pass.
pub fn normalize(table: Table, options: &CleaningOptions) -> Result<Table, NormalizeError> {
    let columns = &options.columns;
    let raw_rows = table.len();
    let mut table = table;

    if options.lowercase_cols {
        table = passes::lowercase_columns(table);
        log_pass("column names", raw_rows, &table);
    }

    if let Some(min_lat) = options.min_lat {
        let before = table.len();
        table = passes::filter_latitude(table, &columns.latitude, min_lat)?;
        log_pass("latitude filter", before, &table);
    }

    if options.fix_shootings {
        let before = table.len();
        table = passes::standardize_shootings(table, &columns.shooting)?;
        log_pass("shooting flags", before, &table);
    }

    let before = table.len();
    table = passes::title_case_columns(table, &options.title_case_cols)?;
    log_pass("title case", before, &table);

    if options.offense_group_needed {
        let before = table.len();
        table = passes::reconcile_categories(table, &columns.offense_code, &columns.category)?;
        log_pass("category reconciliation", before, &table);
    }

    let before = table.len();
    table = passes::drop_nulls(table, &options.no_nan_cols)?;
    log_pass("null elimination", before, &table);

    if options.fix_time {
        let before = table.len();
        table = passes::decompose_time(table, &columns.occurred_on, &columns.year, &columns.month)?;
        log_pass("time decomposition", before, &table);
    }

    let before = table.len();
    table = table.drop_columns(&options.del_cols);
    log_pass("column pruning", before, &table);

    if options.fix_streets {
        let before = table.len();
        table = passes::canonicalize_streets(table, &columns.street)?;
        log_pass("street canonicalization", before, &table);
    }

    log::info!("Normalized {} of {raw_rows} raw rows", table.len());
    Ok(table)
}

/// Normalizes the table and converts it into typed records.
///
/// # Errors
///
/// Returns [`NormalizeError`] if any pass or the conversion fails.
pub fn clean(table: Table, options: &CleaningOptions) -> Result<CanonicalTable, NormalizeError> {
    let table = normalize(table, options)?;
    canonical::to_canonical(&table, &options.columns)
}
