//! Result schema construction.
//!
//! The output of a join is the left columns followed by the right columns,
//! as empty copies. One side's key columns are redundant (the right side's
//! for INNER, LEFT_OUTER, and FULL_OUTER; the left side's for RIGHT_OUTER);
//! their output positions form the ignore-set. Right-side names that collide
//! with a surviving column are aliased `T<n>.<name>` or rejected.

use hashbrown::HashSet;

use coltab_error::{ColtabError, Result};
use coltab_types::{Column, Table};

use crate::join_type::JoinType;
use crate::key::JoinKey;

/// Per-call source of `T<n>` aliases, starting at `T2`.
#[derive(Debug, Clone)]
pub struct AliasSequence {
    next: usize,
}

impl Default for AliasSequence {
    fn default() -> Self {
        Self { next: 2 }
    }
}

impl AliasSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next alias token and advance.
    pub fn next_alias(&mut self) -> String {
        let alias = format!("T{}", self.next);
        self.next += 1;
        alias
    }
}

/// Empty output table plus the redundant key positions.
#[derive(Debug, Clone)]
pub struct ResultSchema {
    pub table: Table,
    /// Output positions of the redundant key columns, ascending.
    pub ignore: Vec<usize>,
    pub left_width: usize,
    pub right_width: usize,
}

impl ResultSchema {
    #[must_use]
    pub fn is_ignored(&self, position: usize) -> bool {
        self.ignore.binary_search(&position).is_ok()
    }

    /// Column count of the final table.
    #[must_use]
    pub fn output_width(&self, keep_all_join_key_columns: bool) -> usize {
        if keep_all_join_key_columns {
            self.left_width + self.right_width
        } else {
            self.left_width + self.right_width - self.ignore.len()
        }
    }
}

/// Settings that shape the output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    pub join_type: JoinType,
    pub allow_duplicate_column_names: bool,
    pub keep_all_join_key_columns: bool,
}

/// Build the empty result table and its ignore-set.
///
/// # Errors
///
/// Returns [`ColtabError::DuplicateColumnName`] when a surviving right-side
/// column collides with a surviving name and aliasing is not allowed.
pub fn build_schema(
    left: &Table,
    right: &Table,
    key: &JoinKey,
    options: SchemaOptions,
    alias: &str,
) -> Result<ResultSchema> {
    let left_width = left.column_count();
    let right_width = right.column_count();

    let mut ignore: Vec<usize> = if options.join_type.suppresses_left_keys() {
        key.pairs().iter().map(|p| p.left).collect()
    } else {
        key.pairs().iter().map(|p| left_width + p.right).collect()
    };
    ignore.sort_unstable();
    ignore.dedup();
    let dropped = |position: usize| {
        !options.keep_all_join_key_columns && ignore.binary_search(&position).is_ok()
    };
    let right_keys: HashSet<usize> = key.pairs().iter().map(|p| p.right).collect();

    let mut table = Table::new(left.name());
    let mut taken: HashSet<String> = HashSet::new();
    for (i, column) in left.columns().iter().enumerate() {
        if !dropped(i) {
            taken.insert(column.name().to_lowercase());
        }
        push_empty(&mut table, column.empty_copy())?;
    }

    for (j, column) in right.columns().iter().enumerate() {
        let position = left_width + j;
        let mut copy = column.empty_copy();
        if !dropped(position) {
            let lowered = column.name().to_lowercase();
            if taken.contains(&lowered) {
                let is_kept_key = options.keep_all_join_key_columns && right_keys.contains(&j);
                if !(options.allow_duplicate_column_names || is_kept_key) {
                    return Err(ColtabError::DuplicateColumnName {
                        name: column.name().to_owned(),
                    });
                }
                copy.set_name(format!("{alias}.{}", column.name()));
                taken.insert(copy.name().to_lowercase());
            } else {
                taken.insert(lowered);
            }
        }
        push_empty(&mut table, copy)?;
    }

    Ok(ResultSchema {
        table,
        ignore,
        left_width,
        right_width,
    })
}

fn push_empty(table: &mut Table, column: Column) -> Result<()> {
    table
        .add_column(column)
        .map_err(|e| ColtabError::internal(format!("empty schema column rejected: {e}")))
}
