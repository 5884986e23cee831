//! Column-oriented working table.
//!
//! Raw incident exports arrive with slightly different headers each year.
//! [`Table`] keeps every cell as optional text so that the loader can
//! union columns without knowing their types, and the normalization passes
//! can rewrite whole columns at a time.
//!
//! Every transform consumes the table and returns a new one; nothing is
//! mutated behind a shared reference.

/// A single named column. `None` cells are nulls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column header.
    pub name: String,
    /// One value per row.
    pub values: Vec<Option<String>>,
}

/// An immutable, column-oriented table of optional text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    len: usize,
}

impl Table {
    /// Creates a table with no columns and no rows.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            len: 0,
        }
    }

    /// Builds a table from a header row and row-major cells.
    ///
    /// Short rows are padded with nulls and surplus cells are ignored, so
    /// ragged input never shifts values into the wrong column. Repeated
    /// headers keep their first occurrence.
    #[must_use]
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let len = rows.len();
        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
        let mut positions: Vec<Option<usize>> = Vec::with_capacity(headers.len());

        for header in headers {
            if columns.iter().any(|c| c.name == header) {
                positions.push(None);
            } else {
                positions.push(Some(columns.len()));
                columns.push(Column {
                    name: header,
                    values: Vec::with_capacity(len),
                });
            }
        }

        for row in rows {
            let mut cells = row.into_iter();
            for position in &positions {
                let cell = cells.next().flatten();
                if let Some(idx) = position {
                    columns[*idx].values.push(cell);
                }
            }
        }

        Self { columns, len }
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column headers in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns `true` if a column with this exact name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Returns the values of the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Returns a single cell, or `None` if the column is absent or the
    /// cell is null.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name)?.get(row)?.as_deref()
    }

    /// Appends `other` below `self`.
    ///
    /// The result carries the union of both column sets, in first-seen
    /// order. Cells for columns a side did not have are null.
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        let top = self.len;
        let bottom = other.len;

        let mut incoming = other.columns;
        for column in &mut self.columns {
            if let Some(idx) = incoming.iter().position(|c| c.name == column.name) {
                let matched = incoming.remove(idx);
                column.values.extend(matched.values);
            } else {
                column.values.resize(top + bottom, None);
            }
        }

        for column in incoming {
            let mut values = vec![None; top];
            values.extend(column.values);
            self.columns.push(Column {
                name: column.name,
                values,
            });
        }

        self.len = top + bottom;
        self
    }

    /// Keeps only the rows whose entry in `keep` is `true`.
    ///
    /// Rows beyond the end of `keep` are dropped.
    #[must_use]
    pub fn retain_rows(mut self, keep: &[bool]) -> Self {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column
                .values
                .retain(|_| flags.next().copied().unwrap_or(false));
        }
        self.len = keep.iter().take(self.len).filter(|k| **k).count();
        self
    }

    /// Adds a column, or replaces the values of an existing one.
    ///
    /// `values` is padded with nulls or truncated to the table length.
    #[must_use]
    pub fn with_column(mut self, name: &str, mut values: Vec<Option<String>>) -> Self {
        values.resize(self.len, None);
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
            column.values = values;
        } else {
            self.columns.push(Column {
                name: name.to_owned(),
                values,
            });
        }
        self
    }

    /// Renames every column through `rename`.
    ///
    /// Columns that end up sharing a name are merged: for each row the
    /// first non-null value wins. This happens when two yearly exports
    /// spell the same header with different casing.
    #[must_use]
    pub fn rename_columns(self, rename: impl Fn(&str) -> String) -> Self {
        let mut merged: Vec<Column> = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let name = rename(&column.name);
            if let Some(existing) = merged.iter_mut().find(|c| c.name == name) {
                for (slot, value) in existing.values.iter_mut().zip(column.values) {
                    if slot.is_none() {
                        *slot = value;
                    }
                }
            } else {
                merged.push(Column {
                    name,
                    values: column.values,
                });
            }
        }
        Self {
            columns: merged,
            len: self.len,
        }
    }

    /// Removes the named columns. Names that are not present are ignored.
    #[must_use]
    pub fn drop_columns<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.columns
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![cell("1"), cell("x")], vec![cell("2"), None]],
        )
    }

    #[test]
    fn pads_short_rows() {
        let table = Table::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![cell("1")]],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "a"), Some("1"));
        assert_eq!(table.value(0, "b"), None);
    }

    #[test]
    fn append_unions_columns_and_null_fills() {
        let other = Table::from_rows(
            vec!["b".to_string(), "c".to_string()],
            vec![vec![cell("y"), cell("z")]],
        );
        let table = sample().append(other);

        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(table.value(2, "a"), None);
        assert_eq!(table.value(2, "b"), Some("y"));
        assert_eq!(table.value(0, "c"), None);
        assert_eq!(table.value(2, "c"), Some("z"));
    }

    #[test]
    fn append_to_empty_keeps_other() {
        let table = Table::empty().append(sample());
        assert_eq!(table, sample());
    }

    #[test]
    fn retain_rows_filters_every_column() {
        let table = sample().retain_rows(&[false, true]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "a"), Some("2"));
        assert_eq!(table.value(0, "b"), None);
    }

    #[test]
    fn rename_merges_colliding_columns() {
        let table = Table::from_rows(
            vec!["LAT".to_string(), "lat".to_string()],
            vec![vec![cell("42.1"), None], vec![None, cell("42.3")]],
        )
        .rename_columns(str::to_lowercase);

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["lat"]);
        assert_eq!(table.value(0, "lat"), Some("42.1"));
        assert_eq!(table.value(1, "lat"), Some("42.3"));
    }

    #[test]
    fn with_column_replaces_in_place() {
        let table = sample().with_column("a", vec![cell("9"), cell("8")]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.value(1, "a"), Some("8"));
    }

    #[test]
    fn drop_columns_ignores_missing() {
        let table = sample().drop_columns(&["b", "nope"]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(table.len(), 2);
    }
}
