//! Join key resolution and validation.

use smallvec::SmallVec;

use coltab_error::{ColtabError, Result};
use coltab_types::{ColumnType, Table};

/// One key column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    /// Column position in the left table.
    pub left: usize,
    /// Column position in the right table.
    pub right: usize,
    /// Declared type of the left key column.
    pub left_type: ColumnType,
    /// Declared type of the right key column.
    pub right_type: ColumnType,
}

/// Ordered list of congruent key column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey {
    pairs: SmallVec<[KeyPair; 4]>,
}

impl JoinKey {
    /// Resolve key column names against both tables.
    ///
    /// Checks run in order: equal arity, non-empty key, every name resolves,
    /// every type is joinable, every pair is congruent.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn resolve<L, R>(
        left: &Table,
        right: &Table,
        left_names: &[L],
        right_names: &[R],
    ) -> Result<Self>
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        check_arity(left_names.len(), right_names.len())?;
        let left_positions = left_names
            .iter()
            .map(|n| left.column_index(n.as_ref()))
            .collect::<Result<SmallVec<[usize; 4]>>>()?;
        let right_positions = right_names
            .iter()
            .map(|n| right.column_index(n.as_ref()))
            .collect::<Result<SmallVec<[usize; 4]>>>()?;
        Self::from_positions(left, right, &left_positions, &right_positions)
    }

    /// Build a key from column positions.
    ///
    /// # Errors
    ///
    /// Same checks as [`JoinKey::resolve`]; a position past the end reports
    /// [`ColtabError::ColumnNotFound`].
    pub fn from_positions(
        left: &Table,
        right: &Table,
        left_positions: &[usize],
        right_positions: &[usize],
    ) -> Result<Self> {
        check_arity(left_positions.len(), right_positions.len())?;
        let mut pairs = SmallVec::new();
        for (&l, &r) in left_positions.iter().zip(right_positions) {
            let left_column = left.column(l).ok_or_else(|| ColtabError::ColumnNotFound {
                table: left.name().to_owned(),
                name: format!("#{l}"),
            })?;
            let right_column = right.column(r).ok_or_else(|| ColtabError::ColumnNotFound {
                table: right.name().to_owned(),
                name: format!("#{r}"),
            })?;
            for column in [left_column, right_column] {
                if !column.column_type().is_joinable() {
                    return Err(ColtabError::UnsupportedKeyType {
                        column: column.name().to_owned(),
                        column_type: column.column_type().to_string(),
                    });
                }
            }
            if !left_column
                .column_type()
                .is_congruent_with(right_column.column_type())
            {
                return Err(ColtabError::IncompatibleKeyTypes {
                    left_column: left_column.name().to_owned(),
                    left_type: left_column.column_type().to_string(),
                    right_column: right_column.name().to_owned(),
                    right_type: right_column.column_type().to_string(),
                });
            }
            pairs.push(KeyPair {
                left: l,
                right: r,
                left_type: left_column.column_type(),
                right_type: right_column.column_type(),
            });
        }
        Ok(Self { pairs })
    }

    /// Key column pairs in key order.
    #[must_use]
    pub fn pairs(&self) -> &[KeyPair] {
        &self.pairs
    }

    /// Number of key columns per side.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always false for a key built by [`JoinKey::resolve`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Left key column positions, in key order.
    #[must_use]
    pub fn left_positions(&self) -> SmallVec<[usize; 4]> {
        self.pairs.iter().map(|p| p.left).collect()
    }

    /// Right key column positions, in key order.
    #[must_use]
    pub fn right_positions(&self) -> SmallVec<[usize; 4]> {
        self.pairs.iter().map(|p| p.right).collect()
    }

    /// True when any left key cell of `row` is missing.
    #[must_use]
    pub fn left_has_missing(&self, table: &Table, row: usize) -> bool {
        self.pairs
            .iter()
            .any(|p| table.column(p.left).is_none_or(|c| c.is_missing(row)))
    }

    /// True when any right key cell of `row` is missing.
    #[must_use]
    pub fn right_has_missing(&self, table: &Table, row: usize) -> bool {
        self.pairs
            .iter()
            .any(|p| table.column(p.right).is_none_or(|c| c.is_missing(row)))
    }
}

fn check_arity(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(ColtabError::KeyArityMismatch { left, right });
    }
    if left == 0 {
        return Err(ColtabError::EmptyJoinKey);
    }
    Ok(())
}
