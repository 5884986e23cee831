//! The individual cleaning passes.
//!
//! Each pass takes the whole table and returns a new one. They are run in
//! a fixed order by [`crate::normalize`], since later passes rely on what
//! earlier ones established (title-cased categories before reconciliation,
//! reconciliation before the raw timestamp column is pruned).

use std::collections::{BTreeMap, HashMap};

use crime_dash_report_models::Table;

use crate::text::{canonical_street, is_intersection, title_case};
use crate::time::{TIMESTAMP_FORMAT, midnight, parse_timestamp};
use crate::{
    DAY_MONTH_YEAR_COLUMN, INTERSECTION_COLUMN, MONTH_YEAR_COLUMN, NormalizeError,
    OCCURRED_AT_COLUMN,
};

fn require<'a>(table: &'a Table, name: &str) -> Result<&'a [Option<String>], NormalizeError> {
    table
        .column(name)
        .ok_or_else(|| NormalizeError::MissingColumn {
            name: name.to_owned(),
        })
}

/// Lowercases every column header.
#[must_use]
pub fn lowercase_columns(table: Table) -> Table {
    table.rename_columns(str::to_lowercase)
}

/// Drops rows whose latitude is null or not strictly above `min_lat`.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if the latitude column is
/// absent and [`NormalizeError::Parse`] if a latitude is not a number.
pub fn filter_latitude(table: Table, column: &str, min_lat: f64) -> Result<Table, NormalizeError> {
    let keep = require(&table, column)?
        .iter()
        .map(|cell| match cell {
            None => Ok(false),
            Some(raw) => raw
                .parse::<f64>()
                .map(|lat| lat > min_lat)
                .map_err(|e| NormalizeError::parse(column, raw, e)),
        })
        .collect::<Result<Vec<bool>, _>>()?;

    Ok(table.retain_rows(&keep))
}

/// Maps a raw shooting indicator onto `Some(true)`/`Some(false)`.
///
/// The accepted domain is `0`, `1`, missing and `Y`. Anything else returns
/// `None`.
#[must_use]
pub fn shooting_flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        None | Some("0") => Some(false),
        Some("1" | "Y") => Some(true),
        Some(_) => None,
    }
}

/// Rewrites the shooting column as `0`/`1`.
///
/// A table without the column gets one filled with `0`, since every row's
/// raw value is missing.
///
/// # Errors
///
/// Returns [`NormalizeError::Domain`] on the first value outside the
/// accepted domain.
pub fn standardize_shootings(table: Table, column: &str) -> Result<Table, NormalizeError> {
    let values = match table.column(column) {
        None => vec![Some("0".to_owned()); table.len()],
        Some(cells) => cells
            .iter()
            .map(|cell| {
                shooting_flag(cell.as_deref())
                    .map(|flag| Some(if flag { "1" } else { "0" }.to_owned()))
                    .ok_or_else(|| NormalizeError::Domain {
                        column: column.to_owned(),
                        value: cell.clone().unwrap_or_default(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(table.with_column(column, values))
}

/// Title-cases the values of each listed column.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if a listed column is absent.
pub fn title_case_columns<S: AsRef<str>>(
    table: Table,
    columns: &[S],
) -> Result<Table, NormalizeError> {
    let mut table = table;
    for name in columns {
        let name = name.as_ref();
        let values = require(&table, name)?
            .iter()
            .map(|cell| cell.as_deref().map(title_case))
            .collect();
        table = table.with_column(name, values);
    }
    Ok(table)
}

/// Builds the code-to-category lookup from the rows that have both.
///
/// A code observed under more than one category resolves to the category
/// it appears with most often; ties go to the alphabetically first label.
#[must_use]
pub fn category_lookup(codes: &[Option<String>], categories: &[Option<String>]) -> HashMap<String, String> {
    let mut tallies: HashMap<&str, BTreeMap<&str, u64>> = HashMap::new();
    for (code, category) in codes.iter().zip(categories) {
        if let (Some(code), Some(category)) = (code, category) {
            *tallies
                .entry(code.as_str())
                .or_default()
                .entry(category.as_str())
                .or_default() += 1;
        }
    }

    tallies
        .into_iter()
        .filter_map(|(code, counts)| {
            let mut best: Option<(&str, u64)> = None;
            for (category, count) in counts {
                if best.is_none_or(|(_, n)| count > n) {
                    best = Some((category, count));
                }
            }
            best.map(|(category, _)| (code.to_owned(), category.to_owned()))
        })
        .collect()
}

/// Rewrites every row's category from its offense code.
///
/// Rows whose code never appears with a category are dropped. Rows with a
/// null category but a known code get that code's category.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if either column is absent.
pub fn reconcile_categories(
    table: Table,
    code_column: &str,
    category_column: &str,
) -> Result<Table, NormalizeError> {
    let codes = require(&table, code_column)?;
    let lookup = category_lookup(codes, require(&table, category_column)?);

    let resolved: Vec<Option<&String>> = codes
        .iter()
        .map(|code| code.as_ref().and_then(|c| lookup.get(c)))
        .collect();
    let keep: Vec<bool> = resolved.iter().map(Option::is_some).collect();
    let categories: Vec<Option<String>> = resolved.into_iter().flatten().cloned().map(Some).collect();

    log::debug!(
        "Resolved {} offense codes to categories; {} rows have no known code",
        lookup.len(),
        keep.iter().filter(|k| !**k).count()
    );

    Ok(table
        .retain_rows(&keep)
        .with_column(category_column, categories))
}

/// Drops rows with a null in any listed column.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if a listed column is absent.
pub fn drop_nulls<S: AsRef<str>>(table: Table, columns: &[S]) -> Result<Table, NormalizeError> {
    let mut keep = vec![true; table.len()];
    for name in columns {
        for (flag, cell) in keep.iter_mut().zip(require(&table, name.as_ref())?) {
            *flag &= cell.is_some();
        }
    }
    Ok(table.retain_rows(&keep))
}

/// Parses a required integer cell.
pub(crate) fn parse_int<T: std::str::FromStr>(
    column: &str,
    cell: Option<&str>,
) -> Result<T, NormalizeError>
where
    T::Err: std::fmt::Display,
{
    let raw = cell.ok_or_else(|| NormalizeError::Parse {
        column: column.to_owned(),
        value: String::new(),
        reason: "missing value".to_owned(),
    })?;
    raw.trim()
        .parse::<T>()
        .map_err(|e| NormalizeError::parse(column, raw, e))
}

/// Parses a required timestamp cell.
pub(crate) fn parse_occurred_at(
    column: &str,
    cell: Option<&str>,
) -> Result<chrono::NaiveDateTime, NormalizeError> {
    let raw = cell.unwrap_or_default();
    parse_timestamp(raw).ok_or_else(|| NormalizeError::Parse {
        column: column.to_owned(),
        value: raw.to_owned(),
        reason: "not an ISO-8601 timestamp".to_owned(),
    })
}

/// First of the reporting month and the reporting date, both at midnight.
pub(crate) fn calendar_keys(
    year: i32,
    month: u32,
    day: u32,
) -> Result<(chrono::NaiveDateTime, chrono::NaiveDateTime), NormalizeError> {
    let invalid = || NormalizeError::Parse {
        column: MONTH_YEAR_COLUMN.to_owned(),
        value: format!("{year}-{month}-{day}"),
        reason: "no such calendar date".to_owned(),
    };
    let month_year = midnight(year, month, 1).ok_or_else(invalid)?;
    let day_month_year = midnight(year, month, day).ok_or_else(invalid)?;
    Ok((month_year, day_month_year))
}

/// Parses the raw timestamp and adds the `occurred_at`, `month_year` and
/// `day_month_year` columns.
///
/// If the raw column has already been pruned and `occurred_at` exists, the
/// table was decomposed earlier and is returned unchanged.
///
/// # Errors
///
/// Returns [`NormalizeError::Parse`] if a timestamp, year or month cannot
/// be parsed or names an impossible date.
pub fn decompose_time(
    table: Table,
    raw_column: &str,
    year_column: &str,
    month_column: &str,
) -> Result<Table, NormalizeError> {
    if !table.has_column(raw_column) && table.has_column(OCCURRED_AT_COLUMN) {
        return Ok(table);
    }

    let raw = require(&table, raw_column)?;
    let years = require(&table, year_column)?;
    let months = require(&table, month_column)?;

    let mut occurred = Vec::with_capacity(table.len());
    let mut month_years = Vec::with_capacity(table.len());
    let mut day_month_years = Vec::with_capacity(table.len());

    for ((stamp, year), month) in raw.iter().zip(years).zip(months) {
        let at = parse_occurred_at(raw_column, stamp.as_deref())?;
        let year: i32 = parse_int(year_column, year.as_deref())?;
        let month: u32 = parse_int(month_column, month.as_deref())?;
        let (month_year, day_month_year) =
            calendar_keys(year, month, chrono::Datelike::day(&at))?;

        occurred.push(Some(at.format(TIMESTAMP_FORMAT).to_string()));
        month_years.push(Some(month_year.format(TIMESTAMP_FORMAT).to_string()));
        day_month_years.push(Some(day_month_year.format(TIMESTAMP_FORMAT).to_string()));
    }

    Ok(table
        .with_column(OCCURRED_AT_COLUMN, occurred)
        .with_column(MONTH_YEAR_COLUMN, month_years)
        .with_column(DAY_MONTH_YEAR_COLUMN, day_month_years))
}

/// Cuts each street at its first line break and adds the `intersection`
/// column.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if the street column is absent.
pub fn canonicalize_streets(table: Table, column: &str) -> Result<Table, NormalizeError> {
    let streets: Vec<Option<String>> = require(&table, column)?
        .iter()
        .map(|cell| cell.as_deref().map(|s| canonical_street(s).to_owned()))
        .collect();
    let intersections = streets
        .iter()
        .map(|street| {
            let flag = street.as_deref().is_some_and(is_intersection);
            Some(flag.to_string())
        })
        .collect();

    Ok(table
        .with_column(column, streets)
        .with_column(INTERSECTION_COLUMN, intersections))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> Table {
        Table::from_rows(
            headers.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.map(ToString::to_string)).collect())
                .collect(),
        )
    }

    #[test]
    fn latitude_filter_is_strict_and_drops_nulls() {
        let t = table(
            &["lat"],
            &[&[Some("42.35")], &[Some("42")], &[Some("-1")], &[None]],
        );
        let out = filter_latitude(t, "lat", 42.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.value(0, "lat"), Some("42.35"));
    }

    #[test]
    fn latitude_filter_rejects_text() {
        let t = table(&["lat"], &[&[Some("north")]]);
        let err = filter_latitude(t, "lat", 42.0).unwrap_err();
        assert!(matches!(err, NormalizeError::Parse { .. }), "{err}");
    }

    #[test]
    fn shooting_domain_maps_to_binary() {
        let t = table(
            &["shooting"],
            &[&[Some("0")], &[Some("1")], &[None], &[Some("Y")]],
        );
        let out = standardize_shootings(t, "shooting").unwrap();
        let values: Vec<Option<&str>> = (0..4).map(|i| out.value(i, "shooting")).collect();
        assert_eq!(values, vec![Some("0"), Some("1"), Some("0"), Some("1")]);
    }

    #[test]
    fn shooting_rejects_unknown_value() {
        let t = table(&["shooting"], &[&[Some("0")], &[Some("N")]]);
        let err = standardize_shootings(t, "shooting").unwrap_err();
        match err {
            NormalizeError::Domain { column, value } => {
                assert_eq!(column, "shooting");
                assert_eq!(value, "N");
            }
            other => panic!("expected Domain error, got {other}"),
        }
    }

    #[test]
    fn shooting_column_created_when_absent() {
        let t = table(&["lat"], &[&[Some("42.3")]]);
        let out = standardize_shootings(t, "shooting").unwrap();
        assert_eq!(out.value(0, "shooting"), Some("0"));
    }

    #[test]
    fn lookup_prefers_most_frequent_then_alphabetical() {
        let codes = vec![
            Some("100".to_string()),
            Some("100".to_string()),
            Some("100".to_string()),
            Some("200".to_string()),
            Some("200".to_string()),
        ];
        let cats = vec![
            Some("Larceny".to_string()),
            Some("Auto Theft".to_string()),
            Some("Larceny".to_string()),
            Some("Vandalism".to_string()),
            Some("Arson".to_string()),
        ];
        let lookup = category_lookup(&codes, &cats);
        assert_eq!(lookup.get("100").map(String::as_str), Some("Larceny"));
        assert_eq!(lookup.get("200").map(String::as_str), Some("Arson"));
    }

    #[test]
    fn reconciliation_fills_and_drops() {
        let t = table(
            &["offense_code", "offense_code_group"],
            &[
                &[Some("3115"), Some("Investigate Person")],
                &[Some("3115"), None],
                &[Some("9999"), None],
                &[None, Some("Larceny")],
            ],
        );
        let out = reconcile_categories(t, "offense_code", "offense_code_group").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.value(1, "offense_code_group"), Some("Investigate Person"));
    }

    #[test]
    fn drop_nulls_checks_every_listed_column() {
        let t = table(
            &["street", "district"],
            &[&[Some("A St"), Some("B2")], &[None, Some("B2")], &[Some("C St"), None]],
        );
        let out = drop_nulls(t, &["street", "district"]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.value(0, "street"), Some("A St"));
    }

    #[test]
    fn drop_nulls_requires_columns() {
        let t = table(&["street"], &[&[Some("A St")]]);
        let err = drop_nulls(t, &["district"]).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingColumn { .. }), "{err}");
    }

    #[test]
    fn decomposes_timestamps() {
        let t = table(
            &["occurred_on_date", "year", "month"],
            &[&[Some("2019-06-15 21:30:00"), Some("2019"), Some("6")]],
        );
        let out = decompose_time(t, "occurred_on_date", "year", "month").unwrap();
        assert_eq!(out.value(0, OCCURRED_AT_COLUMN), Some("2019-06-15 21:30:00"));
        assert_eq!(out.value(0, MONTH_YEAR_COLUMN), Some("2019-06-01 00:00:00"));
        assert_eq!(out.value(0, DAY_MONTH_YEAR_COLUMN), Some("2019-06-15 00:00:00"));
    }

    #[test]
    fn unparseable_timestamp_is_an_error() {
        let t = table(
            &["occurred_on_date", "year", "month"],
            &[&[Some("yesterday"), Some("2019"), Some("6")]],
        );
        let err = decompose_time(t, "occurred_on_date", "year", "month").unwrap_err();
        assert!(matches!(err, NormalizeError::Parse { .. }), "{err}");
    }

    #[test]
    fn impossible_reporting_date_is_an_error() {
        let t = table(
            &["occurred_on_date", "year", "month"],
            &[&[Some("2019-01-31 10:00:00"), Some("2019"), Some("2")]],
        );
        let err = decompose_time(t, "occurred_on_date", "year", "month").unwrap_err();
        assert!(matches!(err, NormalizeError::Parse { .. }), "{err}");
    }

    #[test]
    fn streets_are_cut_and_flagged() {
        let t = table(
            &["street"],
            &[
                &[Some("Washington St\nBoston, MA 02118")],
                &[Some("Mass Ave & Harrison Ave")],
                &[None],
            ],
        );
        let out = canonicalize_streets(t, "street").unwrap();
        assert_eq!(out.value(0, "street"), Some("Washington St"));
        assert_eq!(out.value(0, INTERSECTION_COLUMN), Some("false"));
        assert_eq!(out.value(1, INTERSECTION_COLUMN), Some("true"));
        assert_eq!(out.value(2, "street"), None);
        assert_eq!(out.value(2, INTERSECTION_COLUMN), Some("false"));
    }
}
