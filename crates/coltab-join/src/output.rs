//! Result table under construction.

use coltab_error::{ColtabError, Result};
use coltab_types::{Column, ColumnType, Selection, Table, Value};

use crate::key::JoinKey;
use crate::schema::ResultSchema;

pub(crate) const LEFT_ROW_ID: &str = "_left_record_id_";
pub(crate) const RIGHT_ROW_ID: &str = "_right_record_id_";

/// Which input a row id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Appends joined rows column by column.
///
/// Positions in the ignore-set are skipped while rows are added unless all
/// key columns are kept; [`ResultBuilder::finish`] drops them.
#[derive(Debug)]
pub(crate) struct ResultBuilder {
    name: String,
    columns: Vec<Column>,
    skip: Vec<bool>,
    left_width: usize,
    /// `(left output position, right key position)` for surviving left keys.
    left_key_fill: Vec<(usize, usize)>,
    row_ids: bool,
    rows: usize,
}

impl ResultBuilder {
    pub(crate) fn new(schema: ResultSchema, key: &JoinKey, keep_all: bool) -> Self {
        let width = schema.left_width + schema.right_width;
        let skip = (0..width)
            .map(|p| !keep_all && schema.is_ignored(p))
            .collect::<Vec<_>>();
        let left_key_fill = if keep_all {
            Vec::new()
        } else {
            key.pairs()
                .iter()
                .filter(|p| !skip[p.left])
                .map(|p| (p.left, p.right))
                .collect()
        };
        Self {
            name: schema.table.name().to_owned(),
            columns: schema.table.into_columns(),
            skip,
            left_width: schema.left_width,
            left_key_fill,
            row_ids: false,
            rows: 0,
        }
    }

    /// Track source row ids in two trailing integer columns.
    pub(crate) fn with_row_ids(mut self) -> Self {
        self.columns.push(Column::empty(LEFT_ROW_ID, ColumnType::Integer));
        self.columns.push(Column::empty(RIGHT_ROW_ID, ColumnType::Integer));
        self.row_ids = true;
        self
    }

    fn width(&self) -> usize {
        self.skip.len()
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    /// One output row from a left row and a right row.
    pub(crate) fn push_pair(
        &mut self,
        left: &Table,
        left_row: usize,
        right: &Table,
        right_row: usize,
    ) -> Result<()> {
        for p in 0..self.width() {
            if self.skip[p] {
                continue;
            }
            let (source, row, src) = if p < self.left_width {
                (left, left_row, p)
            } else {
                (right, right_row, p - self.left_width)
            };
            self.columns[p].append_from(source_column(source, src)?, row)?;
        }
        self.rows += 1;
        Ok(())
    }

    /// One output row for an unmatched left row; right columns missing.
    pub(crate) fn push_left_only(&mut self, left: &Table, left_row: usize) -> Result<()> {
        for p in 0..self.width() {
            if self.skip[p] {
                continue;
            }
            if p < self.left_width {
                self.columns[p].append_from(source_column(left, p)?, left_row)?;
            } else {
                self.columns[p].append_missing();
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// One output row for an unmatched right row; left columns missing.
    ///
    /// Unless all key columns are kept, surviving left key positions take
    /// the right key value.
    pub(crate) fn push_right_only(&mut self, right: &Table, right_row: usize) -> Result<()> {
        for p in 0..self.width() {
            if self.skip[p] {
                continue;
            }
            if p >= self.left_width {
                let src = p - self.left_width;
                self.columns[p].append_from(source_column(right, src)?, right_row)?;
            } else if let Some(&(_, r)) = self.left_key_fill.iter().find(|(l, _)| *l == p) {
                self.columns[p].append_from(source_column(right, r)?, right_row)?;
            } else {
                self.columns[p].append_missing();
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Record source row ids for the row just pushed.
    pub(crate) fn push_row_ids(&mut self, left: Option<usize>, right: Option<usize>) -> Result<()> {
        if !self.row_ids {
            return Err(ColtabError::internal("row ids were not enabled"));
        }
        let base = self.width();
        for (offset, id) in [(0, left), (1, right)] {
            let value = match id {
                Some(id) => Value::Integer(row_id_to_i32(id)?),
                None => Value::Missing,
            };
            self.columns[base + offset].append_value(&value)?;
        }
        Ok(())
    }

    /// Distinct row ids of one side present in the result so far.
    pub(crate) fn present_row_ids(&self, side: Side) -> Result<Selection> {
        if !self.row_ids {
            return Err(ColtabError::internal("row ids were not enabled"));
        }
        let column = match side {
            Side::Left => &self.columns[self.width()],
            Side::Right => &self.columns[self.width() + 1],
        };
        let mut ids = Vec::with_capacity(column.len());
        for row in 0..column.len() {
            if let Value::Integer(id) = column.value_at(row)? {
                ids.push(row_id_from_i32(id)?);
            }
        }
        Ok(Selection::from_rows(ids))
    }

    /// Drop row-id and ignored columns and assemble the table.
    pub(crate) fn finish(mut self) -> Result<Table> {
        if self.row_ids {
            self.columns.truncate(self.width());
        }
        let skip = self.skip;
        let columns = self
            .columns
            .into_iter()
            .zip(skip)
            .filter_map(|(column, skipped)| (!skipped).then_some(column))
            .collect::<Vec<_>>();
        if let Some(short) = columns.iter().find(|c| c.len() != self.rows) {
            return Err(ColtabError::internal(format!(
                "result column '{}' has {} rows, expected {}",
                short.name(),
                short.len(),
                self.rows
            )));
        }
        Table::create(self.name, columns)
            .map_err(|e| ColtabError::internal(format!("result columns diverged: {e}")))
    }
}

fn source_column(table: &Table, position: usize) -> Result<&Column> {
    table.column(position).ok_or_else(|| {
        ColtabError::internal(format!(
            "source column {position} missing from table '{}'",
            table.name()
        ))
    })
}

pub(crate) fn row_id_to_i32(id: usize) -> Result<i32> {
    i32::try_from(id).map_err(|_| ColtabError::internal(format!("row id {id} exceeds i32")))
}

pub(crate) fn row_id_from_i32(id: i32) -> Result<usize> {
    usize::try_from(id).map_err(|_| ColtabError::internal(format!("negative row id {id}")))
}
