//! One-screen overview of a cleaned table.

use std::collections::BTreeSet;
use std::fmt;

use crime_dash_report_models::{CanonicalTable, CrimeRecord};

/// Headline counts for a [`CanonicalTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of records.
    pub rows: usize,
    /// First and last reporting year, if there are any records.
    pub years: Option<(i32, i32)>,
    /// Distinct offense categories.
    pub categories: usize,
    /// Distinct streets.
    pub streets: usize,
    /// Distinct police districts.
    pub districts: usize,
    /// Records flagged as shootings.
    pub shootings: usize,
    /// Records on a junction of two streets.
    pub intersections: usize,
}

impl Summary {
    /// Counts the headline figures of `table`.
    #[must_use]
    pub fn of(table: &CanonicalTable) -> Self {
        let years: BTreeSet<i32> = table.iter().map(|r| r.year).collect();
        let distinct = |f: fn(&CrimeRecord) -> &str| table.iter().map(f).collect::<BTreeSet<_>>().len();

        Self {
            rows: table.len(),
            years: years.first().copied().zip(years.last().copied()),
            categories: distinct(|r| r.offense_category.as_str()),
            streets: distinct(|r| r.street.as_str()),
            districts: distinct(|r| r.district.as_str()),
            shootings: table.iter().filter(|r| r.shooting).count(),
            intersections: table.iter().filter(|r| r.intersection).count(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {}", "Rows", self.rows)?;
        match self.years {
            Some((first, last)) => writeln!(f, "{:<16} {first}-{last}", "Years")?,
            None => writeln!(f, "{:<16} -", "Years")?,
        }
        writeln!(f, "{:<16} {}", "Categories", self.categories)?;
        writeln!(f, "{:<16} {}", "Streets", self.streets)?;
        writeln!(f, "{:<16} {}", "Districts", self.districts)?;
        writeln!(f, "{:<16} {}", "Shootings", self.shootings)?;
        write!(f, "{:<16} {}", "Intersections", self.intersections)
    }
}
