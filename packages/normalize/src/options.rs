//! Cleaning configuration.
//!
//! [`CleaningOptions`] toggles each normalization pass and names the
//! columns each pass reads. It deserializes from TOML with every field
//! optional; omitted fields take the defaults below.

use serde::Deserialize;

use crate::NormalizeError;

/// Boston preset, embedded at compile time.
const BOSTON_TOML: &str = include_str!("../config/boston.toml");

/// Source column names for each role, after column-name normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Unique incident identifier.
    pub incident_id: String,
    /// Offense code (many-to-one with category).
    pub offense_code: String,
    /// Offense category / code group.
    pub category: String,
    /// Free-text offense description.
    pub description: String,
    /// Police district.
    pub district: String,
    /// Street / location text.
    pub street: String,
    /// Latitude.
    pub latitude: String,
    /// Longitude.
    pub longitude: String,
    /// Raw shooting indicator.
    pub shooting: String,
    /// Raw ISO-8601 occurrence timestamp.
    pub occurred_on: String,
    /// Reporting year.
    pub year: String,
    /// Reporting month.
    pub month: String,
    /// Day-of-week name.
    pub day_of_week: String,
    /// Hour of day.
    pub hour: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            incident_id: "incident_number".to_owned(),
            offense_code: "offense_code".to_owned(),
            category: "offense_code_group".to_owned(),
            description: "offense_description".to_owned(),
            district: "district".to_owned(),
            street: "street".to_owned(),
            latitude: "lat".to_owned(),
            longitude: "long".to_owned(),
            shooting: "shooting".to_owned(),
            occurred_on: "occurred_on_date".to_owned(),
            year: "year".to_owned(),
            month: "month".to_owned(),
            day_of_week: "day_of_week".to_owned(),
            hour: "hour".to_owned(),
        }
    }
}

/// Which passes run, and how.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Lowercase every column header.
    pub lowercase_cols: bool,
    /// Drop rows whose latitude is not strictly greater than this.
    /// `None` skips the geographic filter.
    pub min_lat: Option<f64>,
    /// Map the raw shooting indicator onto `0`/`1`.
    pub fix_shootings: bool,
    /// Columns whose values are title-cased.
    pub title_case_cols: Vec<String>,
    /// Rebuild every row's category from its offense code.
    pub offense_group_needed: bool,
    /// Columns that must be non-null; rows with a null here are dropped.
    pub no_nan_cols: Vec<String>,
    /// Parse the raw timestamp and derive the month/day columns.
    pub fix_time: bool,
    /// Columns removed once the other passes no longer need them.
    pub del_cols: Vec<String>,
    /// Cut street text at the first line break and flag intersections.
    pub fix_streets: bool,
    /// Column names for each role.
    pub columns: ColumnNames,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            lowercase_cols: true,
            min_lat: Some(42.0),
            fix_shootings: true,
            title_case_cols: Vec::new(),
            offense_group_needed: true,
            no_nan_cols: Vec::new(),
            fix_time: true,
            del_cols: Vec::new(),
            fix_streets: true,
            columns: ColumnNames::default(),
        }
    }
}

impl CleaningOptions {
    /// The preset used for the Boston yearly exports.
    ///
    /// # Panics
    ///
    /// Panics if the embedded preset is malformed, which the unit tests
    /// rule out.
    #[must_use]
    pub fn boston() -> Self {
        parse_cleaning_toml(BOSTON_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse boston.toml: {e}"))
    }
}

/// Parses cleaning options from TOML.
///
/// # Errors
///
/// Returns [`NormalizeError::Config`] if the TOML is malformed or has
/// fields of the wrong type.
pub fn parse_cleaning_toml(contents: &str) -> Result<CleaningOptions, NormalizeError> {
    Ok(toml::from_str(contents)?)
}
