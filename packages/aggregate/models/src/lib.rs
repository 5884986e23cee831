#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter request and result table types for the dashboard aggregations.
//!
//! The dashboard widgets send either one value or a list of values per
//! selector, with a special "all" entry. [`Selection`] captures that raw
//! shape and is resolved once into a [`ValueFilter`], so the engine only
//! ever sees "everything" or an explicit set.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use crime_dash_report_models::DayOfWeek;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Selector entry meaning every offense category.
pub const ALL_CATEGORIES_LABEL: &str = "All Offense Code Groups";

/// Selector entry meaning every street.
pub const ALL_STREETS_LABEL: &str = "All Streets";

/// A resolved filter over one column's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ValueFilter {
    /// Every value observed in the data.
    All,
    /// Only these values. An empty set means nothing is selected.
    Only(BTreeSet<String>),
}

impl ValueFilter {
    /// Builds a filter over the given values.
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if the filter selects nothing at all.
    #[must_use]
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Self::Only(values) if values.is_empty())
    }

    /// Returns `true` if `value` passes the filter.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(values) => values.contains(value),
        }
    }

    /// Human-readable description: the "all" label, or the selected values
    /// joined with commas.
    #[must_use]
    pub fn label(&self, all_label: &str) -> String {
        match self {
            Self::All => all_label.to_owned(),
            Self::Only(values) => values.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
        }
    }
}

/// A selector value as the widgets send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    /// A single value.
    One(String),
    /// Several values.
    Many(Vec<String>),
}

impl Selection {
    /// Resolves the raw selection into a [`ValueFilter`].
    ///
    /// The `all_label` anywhere in the selection selects everything. An
    /// empty string or empty list resolves to an empty filter.
    #[must_use]
    pub fn resolve(&self, all_label: &str) -> ValueFilter {
        match self {
            Self::One(value) if value == all_label => ValueFilter::All,
            Self::One(value) if value.is_empty() => ValueFilter::Only(BTreeSet::new()),
            Self::One(value) => ValueFilter::only([value.as_str()]),
            Self::Many(values) if values.iter().any(|v| v == all_label) => ValueFilter::All,
            Self::Many(values) => ValueFilter::only(values.iter().map(String::as_str)),
        }
    }
}

/// One aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Year the views are scoped to.
    pub year: i32,
    /// Categories for the street-to-category flow table.
    pub categories: ValueFilter,
    /// Streets for the flow table and the time series.
    pub streets: ValueFilter,
    /// Flow groups with fewer incidents than this are dropped.
    pub min_count: u64,
    /// Categories for the time series and map points. Falls back to
    /// `categories` when absent.
    #[serde(default)]
    pub series_categories: Option<ValueFilter>,
}

impl FilterRequest {
    /// The category filter that applies to the time series and map.
    #[must_use]
    pub fn series_filter(&self) -> &ValueFilter {
        self.series_categories.as_ref().unwrap_or(&self.categories)
    }
}

/// A request exactly as the widgets send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilterRequest {
    /// Selected year.
    pub year: i32,
    /// Flow-diagram category selector.
    pub categories: Selection,
    /// Street selector.
    pub streets: Selection,
    /// Minimum-count slider.
    pub min_count: u64,
    /// Map / time-series category selector.
    #[serde(default)]
    pub series_categories: Option<Selection>,
}

impl RawFilterRequest {
    /// Resolves every selector against its "all" label.
    #[must_use]
    pub fn resolve(&self) -> FilterRequest {
        FilterRequest {
            year: self.year,
            categories: self.categories.resolve(ALL_CATEGORIES_LABEL),
            streets: self.streets.resolve(ALL_STREETS_LABEL),
            min_count: self.min_count,
            series_categories: self
                .series_categories
                .as_ref()
                .map(|s| s.resolve(ALL_CATEGORIES_LABEL)),
        }
    }
}

/// One row of the street-to-category flow table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRow {
    /// Source node.
    pub street: String,
    /// Target node.
    pub category: String,
    /// Incidents on this street in this category.
    pub count: u64,
}

/// An incident count for one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount<T> {
    /// The bucket (month, day of week, hour).
    pub bucket: T,
    /// Incidents in the bucket.
    pub count: u64,
}

/// Count of incidents in a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Number of incidents.
    pub count: u64,
}

/// An incident as plotted on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Incident number.
    pub incident_id: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude, if known.
    pub longitude: Option<f64>,
    /// Reporting year.
    pub year: i32,
    /// Offense category.
    pub category: String,
    /// Offense description.
    pub description: Option<String>,
    /// Police district.
    pub district: String,
    /// Street.
    pub street: String,
    /// When the incident occurred.
    pub occurred_at: NaiveDateTime,
}

/// Every table the dashboard needs for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTables {
    /// The year the tables are scoped to.
    pub year: i32,
    /// Street-to-category counts, largest first, at or above the minimum.
    pub flow_table: Vec<FlowRow>,
    /// Counts per observed month, ascending.
    pub month_series: Vec<BucketCount<u32>>,
    /// Counts per day of week, always seven entries from Sunday.
    pub day_series: Vec<BucketCount<DayOfWeek>>,
    /// Counts per observed hour, ascending.
    pub hour_series: Vec<BucketCount<u32>>,
    /// Counts per category over the whole year, largest first.
    pub category_bar: Vec<CategoryCount>,
    /// Incidents of the year in the series categories, on any street.
    pub map_points: Vec<MapPoint>,
    /// Description of the series category selection, for titles.
    pub series_label: String,
}

/// Outcome of an aggregation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "tables", rename_all = "snake_case")]
pub enum Aggregation {
    /// A selector was emptied; keep showing the previous views.
    NoUpdate,
    /// Fresh tables for the request.
    Updated(Box<DashboardTables>),
}

impl Aggregation {
    /// Returns the tables, or `None` for [`Aggregation::NoUpdate`].
    #[must_use]
    pub fn tables(&self) -> Option<&DashboardTables> {
        match self {
            Self::NoUpdate => None,
            Self::Updated(tables) => Some(tables),
        }
    }
}

/// Values that populate the dashboard selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// The "all" label followed by the distinct categories, sorted.
    pub categories: Vec<String>,
    /// The "all" label followed by the distinct streets, sorted.
    pub streets: Vec<String>,
}

/// Time key for map animation frames.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FrameKey {
    /// One frame per reporting year.
    Year,
    /// One frame per reporting month.
    MonthYear,
    /// One frame per reporting date.
    DayMonthYear,
}

/// The incidents shown in one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFrame {
    /// Frame label (e.g. "2019", "2019-06-01 00:00:00").
    pub key: String,
    /// Incidents in the frame.
    pub points: Vec<MapPoint>,
}
