#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Working table and canonical incident record types.
//!
//! Raw exports are loaded into a [`Table`] of optional text cells, cleaned
//! column by column, and finally converted into a [`CanonicalTable`] of
//! typed [`CrimeRecord`]s that every dashboard query reads from.

pub mod table;

use std::sync::Arc;

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use table::{Column, Table};

/// Day of the week, ordered Sunday first as the dashboard displays it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum DayOfWeek {
    /// Sunday
    Sunday,
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
}

impl DayOfWeek {
    /// Returns all days in display order (Sunday through Saturday).
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Sunday,
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
        ]
    }

    /// Zero-based position in display order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }
}

/// One incident after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    /// Incident number from the source export.
    pub incident_id: String,
    /// Title-cased offense group (e.g. "Larceny").
    pub offense_category: String,
    /// Source offense code. Many codes share one category.
    pub offense_code: String,
    /// Free-text offense description, when the export has one.
    pub offense_description: Option<String>,
    /// Police district.
    pub district: String,
    /// Canonical street name.
    pub street: String,
    /// Whether the street is a junction of two streets ("A St & B St").
    pub intersection: bool,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84), when the export has one.
    pub longitude: Option<f64>,
    /// When the incident occurred, in the source's local wall-clock time.
    pub occurred_at: NaiveDateTime,
    /// Reporting year.
    pub year: i32,
    /// Reporting month (1-12).
    pub month: u32,
    /// Day of the week the incident occurred.
    pub day_of_week: DayOfWeek,
    /// Hour of the day (0-23).
    pub hour: u32,
    /// First day of the reporting month at midnight.
    pub month_year: NaiveDateTime,
    /// Reporting year and month with the occurrence day, at midnight.
    pub day_month_year: NaiveDateTime,
    /// Whether a shooting was involved.
    pub shooting: bool,
}

/// The normalized record set that all queries read from.
///
/// Built once per process and shared by reference counting; cloning is
/// cheap and the records are never mutated.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    records: Arc<[CrimeRecord]>,
}

impl CanonicalTable {
    /// Wraps a set of records.
    #[must_use]
    pub fn new(records: Vec<CrimeRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// All records in load order.
    #[must_use]
    pub fn records(&self) -> &[CrimeRecord] {
        &self.records
    }

    /// Iterates over all records.
    pub fn iter(&self) -> std::slice::Iter<'_, CrimeRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CanonicalTable {
    type Item = &'a CrimeRecord;
    type IntoIter = std::slice::Iter<'a, CrimeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
