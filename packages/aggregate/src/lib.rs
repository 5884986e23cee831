#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtered views over the canonical incident table.
//!
//! [`aggregate`] is a pure function of the table and a [`FilterRequest`]:
//! it never mutates the table and never fails. Filter values that do not
//! occur in the data simply match nothing.

pub mod tables;
pub mod views;

use crime_dash_aggregate_models::{
    ALL_CATEGORIES_LABEL, Aggregation, DashboardTables, FilterRequest,
};
use crime_dash_report_models::{CanonicalTable, CrimeRecord};

pub use views::{animation_frames, filter_options};

/// Computes every dashboard table for one filter state.
///
/// Returns [`Aggregation::NoUpdate`] when the street selector, the
/// category selector or the series category override selects nothing.
#[must_use]
pub fn aggregate(table: &CanonicalTable, request: &FilterRequest) -> Aggregation {
    if request.streets.is_empty_selection()
        || request.categories.is_empty_selection()
        || request.series_filter().is_empty_selection()
    {
        log::debug!("aggregate: empty selection for year {}, no update", request.year);
        return Aggregation::NoUpdate;
    }

    let year_scope: Vec<&CrimeRecord> = table.iter().filter(|r| r.year == request.year).collect();

    let flow_subset: Vec<&CrimeRecord> = year_scope
        .iter()
        .copied()
        .filter(|r| request.streets.matches(&r.street))
        .filter(|r| request.categories.matches(&r.offense_category))
        .collect();

    let series = request.series_filter();
    let series_subset: Vec<&CrimeRecord> = year_scope
        .iter()
        .copied()
        .filter(|r| request.streets.matches(&r.street))
        .filter(|r| series.matches(&r.offense_category))
        .collect();

    // The map follows the category selector only, never the street one.
    let map_points: Vec<_> = year_scope
        .iter()
        .filter(|r| series.matches(&r.offense_category))
        .map(|r| tables::map_point(r))
        .collect();

    log::debug!(
        "aggregate: year={} scope={} flow={} series={} map={}",
        request.year,
        year_scope.len(),
        flow_subset.len(),
        series_subset.len(),
        map_points.len(),
    );

    Aggregation::Updated(Box::new(DashboardTables {
        year: request.year,
        flow_table: tables::flow_table(&flow_subset, request.min_count),
        month_series: tables::month_series(&series_subset),
        day_series: tables::day_series(&series_subset),
        hour_series: tables::hour_series(&series_subset),
        category_bar: tables::category_bar(&year_scope),
        map_points,
        series_label: series.label(ALL_CATEGORIES_LABEL),
    }))
}
