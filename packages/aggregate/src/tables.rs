//! Grouped counts over a filtered record subset.
//!
//! Every function takes the subset as a slice of borrowed records and
//! returns an owned, ordered table.

use std::collections::BTreeMap;

use crime_dash_aggregate_models::{BucketCount, CategoryCount, FlowRow, MapPoint};
use crime_dash_report_models::{CrimeRecord, DayOfWeek};

/// Counts incidents per (street, category), largest first, keeping only
/// groups with at least `min_count` incidents.
///
/// Groups with equal counts are ordered by street, then category.
#[must_use]
pub fn flow_table(records: &[&CrimeRecord], min_count: u64) -> Vec<FlowRow> {
    let mut groups: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for record in records {
        *groups
            .entry((record.street.as_str(), record.offense_category.as_str()))
            .or_default() += 1;
    }

    let mut rows: Vec<FlowRow> = groups
        .into_iter()
        .map(|((street, category), count)| FlowRow {
            street: street.to_owned(),
            category: category.to_owned(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.retain(|row| row.count >= min_count);
    rows
}

fn observed_buckets(keys: impl Iterator<Item = u32>) -> Vec<BucketCount<u32>> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(bucket, count)| BucketCount { bucket, count })
        .collect()
}

/// Counts incidents per reporting month, for the months that occur.
#[must_use]
pub fn month_series(records: &[&CrimeRecord]) -> Vec<BucketCount<u32>> {
    observed_buckets(records.iter().map(|r| r.month))
}

/// Counts incidents per hour of day, for the hours that occur.
#[must_use]
pub fn hour_series(records: &[&CrimeRecord]) -> Vec<BucketCount<u32>> {
    observed_buckets(records.iter().map(|r| r.hour))
}

/// Counts incidents per day of week.
///
/// Always returns seven entries, Sunday through Saturday; days with no
/// incidents count zero.
#[must_use]
pub fn day_series(records: &[&CrimeRecord]) -> Vec<BucketCount<DayOfWeek>> {
    let mut counts = [0_u64; 7];
    for record in records {
        counts[record.day_of_week.index()] += 1;
    }
    DayOfWeek::all()
        .iter()
        .map(|day| BucketCount {
            bucket: *day,
            count: counts[day.index()],
        })
        .collect()
}

/// Counts incidents per category, largest first; ties are alphabetical.
#[must_use]
pub fn category_bar(records: &[&CrimeRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.offense_category.as_str()).or_default() += 1;
    }

    let mut bars: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_owned(),
            count,
        })
        .collect();
    bars.sort_by(|a, b| b.count.cmp(&a.count));
    bars
}

/// Converts a record into its map representation.
#[must_use]
pub fn map_point(record: &CrimeRecord) -> MapPoint {
    MapPoint {
        incident_id: record.incident_id.clone(),
        latitude: record.latitude,
        longitude: record.longitude,
        year: record.year,
        category: record.offense_category.clone(),
        description: record.offense_description.clone(),
        district: record.district.clone(),
        street: record.street.clone(),
        occurred_at: record.occurred_at,
    }
}
