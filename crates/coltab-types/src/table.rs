//! Named collections of equal-length columns.

use std::cmp::Ordering;

use coltab_error::{ColtabError, Result};

use crate::column::Column;
use crate::ordering::compare_rows;
use crate::value::Value;

/// An ordered sequence of named columns sharing one row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    /// A table with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Build a table from columns.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::ColumnLengthMismatch`] if the columns disagree
    /// on length.
    pub fn create(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::ColumnLengthMismatch`] if the table already has
    /// columns and `column` has a different length.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(ColtabError::ColumnLengthMismatch {
                column: column.name().to_owned(),
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Position of the column called `name`.
    ///
    /// An exact match wins; otherwise the first ASCII case-insensitive match
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::ColumnNotFound`] when neither lookup succeeds.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| ColtabError::ColumnNotFound {
                table: self.name.clone(),
                name: name.to_owned(),
            })
    }

    /// Column called `name`, see [`Table::column_index`].
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::ColumnNotFound`] when the name does not resolve.
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        let index = self.column_index(name)?;
        Ok(&self.columns[index])
    }

    /// Same name and column shapes, zero rows.
    #[must_use]
    pub fn empty_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            columns: self.columns.iter().map(Column::empty_copy).collect(),
        }
    }

    /// New table holding `rows`, in the given order. Rows may repeat.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] for a row past the end.
    pub fn gather(&self, rows: &[usize]) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.gather(rows))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: self.name.clone(),
            columns,
        })
    }

    /// Drop the columns at `positions`. Positions past the end are ignored.
    pub fn remove_columns(&mut self, positions: &[usize]) {
        let mut index = 0;
        self.columns.retain(|_| {
            let keep = !positions.contains(&index);
            index += 1;
            keep
        });
    }

    /// Every cell of `row`, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] if `row >= row_count`.
    pub fn row_values(&self, row: usize) -> Result<Vec<Value>> {
        if row >= self.row_count() {
            return Err(ColtabError::RowOutOfRange {
                row,
                len: self.row_count(),
            });
        }
        self.columns.iter().map(|c| c.value_at(row)).collect()
    }

    /// Stable ascending sort on the given column positions, earlier
    /// positions taking precedence. Returns a new table.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] if a position does not name a
    /// column.
    pub fn sort_ascending_on(&self, positions: &[usize]) -> Result<Self> {
        let mut keys = Vec::with_capacity(positions.len());
        for &p in positions {
            let column = self.column(p).ok_or(ColtabError::RowOutOfRange {
                row: p,
                len: self.column_count(),
            })?;
            keys.push(column.data());
        }
        self.sorted_by(|&a, &b| {
            keys.iter()
                .map(|data| compare_rows(data, a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Stable sort with a caller-supplied row comparator.
    ///
    /// # Errors
    ///
    /// Propagates [`Table::gather`] failures.
    pub fn sorted_by<F>(&self, mut compare: F) -> Result<Self>
    where
        F: FnMut(&usize, &usize) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|a, b| compare(a, b));
        self.gather(&order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_type::ColumnType;

    fn people() -> Table {
        Table::create(
            "people",
            vec![
                Column::integers("Id", [Some(3), Some(1), None, Some(1)]),
                Column::strings("name", [Some("c"), Some("b"), Some("x"), Some("a")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_ragged_columns() {
        let err = Table::create(
            "t",
            vec![
                Column::integers("a", [Some(1)]),
                Column::integers("b", [Some(1), Some(2)]),
            ],
        )
        .unwrap_err();
        assert!(
            matches!(err, ColtabError::ColumnLengthMismatch { expected: 1, actual: 2, .. }),
            "case=ragged err={err}"
        );
    }

    #[test]
    fn column_index_prefers_exact_match() {
        let t = Table::create(
            "t",
            vec![
                Column::integers("KEY", [Some(1)]),
                Column::integers("key", [Some(2)]),
            ],
        )
        .unwrap();
        assert_eq!(t.column_index("key").unwrap(), 1);
        assert_eq!(t.column_index("Key").unwrap(), 0);
        assert!(matches!(
            t.column_index("nope"),
            Err(ColtabError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn sort_is_stable_with_missing_first() {
        let sorted = people().sort_ascending_on(&[0]).unwrap();
        let names: Vec<String> = (0..sorted.row_count())
            .map(|r| sorted.column(1).unwrap().value_at(r).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["x", "b", "a", "c"]);
    }

    #[test]
    fn gather_remove_and_row_values() {
        let mut t = people().gather(&[3, 3]).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(
            t.row_values(1).unwrap(),
            vec![Value::Integer(1), Value::String("a".into())]
        );
        t.remove_columns(&[0, 9]);
        assert_eq!(t.column_names(), vec!["name"]);
        assert!(t.row_values(2).is_err());
    }

    #[test]
    fn empty_copy_keeps_shape() {
        let e = people().empty_copy();
        assert_eq!(e.column_count(), 2);
        assert_eq!(e.row_count(), 0);
        assert_eq!(e.column(0).unwrap().column_type(), ColumnType::Integer);
    }
}
