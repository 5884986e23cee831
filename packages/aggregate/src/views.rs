//! Selector options and map animation frames.

use std::collections::{BTreeMap, BTreeSet};

use crime_dash_aggregate_models::{
    ALL_CATEGORIES_LABEL, ALL_STREETS_LABEL, AnimationFrame, FilterOptions, FrameKey,
};
use crime_dash_report_models::{CanonicalTable, CrimeRecord};

use crate::tables::map_point;

const FRAME_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn with_all_label<'a>(label: &str, values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = values.collect();
    std::iter::once(label)
        .chain(distinct)
        .map(ToOwned::to_owned)
        .collect()
}

/// Collects the values that populate the dashboard selectors.
#[must_use]
pub fn filter_options(table: &CanonicalTable) -> FilterOptions {
    let years: BTreeSet<i32> = table.iter().map(|r| r.year).collect();

    FilterOptions {
        years: years.into_iter().collect(),
        categories: with_all_label(
            ALL_CATEGORIES_LABEL,
            table.iter().map(|r| r.offense_category.as_str()),
        ),
        streets: with_all_label(ALL_STREETS_LABEL, table.iter().map(|r| r.street.as_str())),
    }
}

fn frame_key(record: &CrimeRecord, key: FrameKey) -> String {
    match key {
        FrameKey::Year => record.year.to_string(),
        FrameKey::MonthYear => record.month_year.format(FRAME_KEY_FORMAT).to_string(),
        FrameKey::DayMonthYear => record.day_month_year.format(FRAME_KEY_FORMAT).to_string(),
    }
}

/// Groups one category's incidents into animation frames, ordered by key.
///
/// Passing [`ALL_CATEGORIES_LABEL`] animates every category. An unknown
/// category yields no frames.
#[must_use]
pub fn animation_frames(table: &CanonicalTable, category: &str, key: FrameKey) -> Vec<AnimationFrame> {
    let mut frames: BTreeMap<String, AnimationFrame> = BTreeMap::new();

    for record in table
        .iter()
        .filter(|r| category == ALL_CATEGORIES_LABEL || r.offense_category == category)
    {
        let label = frame_key(record, key);
        frames
            .entry(label.clone())
            .or_insert_with(|| AnimationFrame {
                key: label,
                points: Vec::new(),
            })
            .points
            .push(map_point(record));
    }

    log::debug!(
        "animation_frames: category={category} key={key} frames={}",
        frames.len()
    );

    frames.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    fn sample() -> CanonicalTable {
        CanonicalTable::new(vec![
            record("A1", "Main St", "Larceny", (2019, 1, 5), 12),
            record("A2", "Elm St", "Larceny", (2019, 1, 20), 9),
            record("A3", "Main St", "Vandalism", (2019, 3, 6), 13),
            record("B1", "Elm St", "Larceny", (2018, 6, 1), 8),
        ])
    }

    #[test]
    fn options_are_sorted_and_prefixed_with_all() {
        let options = filter_options(&sample());

        assert_eq!(options.years, vec![2018, 2019]);
        assert_eq!(
            options.categories,
            vec![ALL_CATEGORIES_LABEL, "Larceny", "Vandalism"]
        );
        assert_eq!(options.streets, vec![ALL_STREETS_LABEL, "Elm St", "Main St"]);
    }

    #[test]
    fn options_of_empty_table_hold_only_labels() {
        let options = filter_options(&CanonicalTable::default());
        assert!(options.years.is_empty());
        assert_eq!(options.categories, vec![ALL_CATEGORIES_LABEL]);
        assert_eq!(options.streets, vec![ALL_STREETS_LABEL]);
    }

    #[test]
    fn frames_group_by_month_in_order() {
        let frames = animation_frames(&sample(), "Larceny", FrameKey::MonthYear);
        let keys: Vec<&str> = frames.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["2018-06-01 00:00:00", "2019-01-01 00:00:00"]);
        assert_eq!(frames[1].points.len(), 2);
    }

    #[test]
    fn frames_by_year_cover_every_category_for_all_label() {
        let frames = animation_frames(&sample(), ALL_CATEGORIES_LABEL, FrameKey::Year);
        let sizes: Vec<(&str, usize)> = frames
            .iter()
            .map(|f| (f.key.as_str(), f.points.len()))
            .collect();
        assert_eq!(sizes, vec![("2018", 1), ("2019", 3)]);
    }

    #[test]
    fn frames_by_day_split_dates() {
        let frames = animation_frames(&sample(), "Larceny", FrameKey::DayMonthYear);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].key, "2018-06-01 00:00:00");
    }

    #[test]
    fn unknown_category_has_no_frames() {
        assert!(animation_frames(&sample(), "Arson", FrameKey::Year).is_empty());
    }
}
