//! Sort-merge join.
//!
//! Both inputs are copied, tagged with a synthetic row-id column, and
//! stably sorted on their key columns. A [`MergeScan`] walks the two sorted
//! copies and yields matching row pairs, replaying the right-side key group
//! from its mark for every left row that shares a key. Unmatched rows for
//! outer joins are found afterwards as `all row ids - row ids present`.

use std::cmp::Ordering;

use coltab_error::{ColtabError, Result};
use coltab_types::{Column, Selection, Table, Value};

use crate::comparator::RowComparatorChain;
use crate::instrumentation::{record_group_replays, record_unmatched_rows};
use crate::output::{LEFT_ROW_ID, RIGHT_ROW_ID, ResultBuilder, Side, row_id_from_i32, row_id_to_i32};
use crate::plan::JoinPlan;
use crate::schema::ResultSchema;

// ── Merge state machine ────────────────────────────────────────────────────

/// Position of a [`MergeScan`] relative to the right-side key groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// Looking for the next pair of equal keys.
    Searching,
    /// Emitting the right group that starts at `mark` for the current left row.
    InGroup { mark: usize },
    /// One side ran out; no more pairs.
    Exhausted,
}

/// Merge pass over two ascending row lists.
///
/// `compare(l, r)` orders a left row against a right row. Yields
/// `(left_row, right_row)` for every pair comparing equal, left-major.
#[derive(Debug)]
pub struct MergeScan<'a, F> {
    left: &'a [usize],
    right: &'a [usize],
    compare: F,
    l: usize,
    r: usize,
    state: MergeState,
    replays: usize,
}

impl<'a, F> MergeScan<'a, F>
where
    F: Fn(usize, usize) -> Ordering,
{
    pub fn new(left: &'a [usize], right: &'a [usize], compare: F) -> Self {
        Self {
            left,
            right,
            compare,
            l: 0,
            r: 0,
            state: MergeState::Searching,
            replays: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> MergeState {
        self.state
    }

    /// How many times the right cursor was rewound to a mark for a
    /// following left row with the same key.
    #[must_use]
    pub const fn replays(&self) -> usize {
        self.replays
    }

    fn cmp_cursors(&self, r: usize) -> Ordering {
        (self.compare)(self.left[self.l], self.right[r])
    }
}

impl<F> Iterator for MergeScan<'_, F>
where
    F: Fn(usize, usize) -> Ordering,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        loop {
            match self.state {
                MergeState::Exhausted => return None,
                MergeState::Searching => {
                    if self.l >= self.left.len() || self.r >= self.right.len() {
                        self.state = MergeState::Exhausted;
                        return None;
                    }
                    match self.cmp_cursors(self.r) {
                        Ordering::Less => self.l += 1,
                        Ordering::Greater => self.r += 1,
                        Ordering::Equal => self.state = MergeState::InGroup { mark: self.r },
                    }
                }
                MergeState::InGroup { mark } => {
                    if self.r < self.right.len() && self.cmp_cursors(self.r).is_eq() {
                        let pair = (self.left[self.l], self.right[self.r]);
                        self.r += 1;
                        return Some(pair);
                    }
                    self.r = mark;
                    self.l += 1;
                    if self.l < self.left.len() && self.cmp_cursors(mark).is_eq() {
                        self.replays += 1;
                    } else {
                        self.state = MergeState::Searching;
                    }
                }
            }
        }
    }
}

// ── Strategy ───────────────────────────────────────────────────────────────

/// Copy of `table` with a trailing row-id column, stably sorted on `positions`.
fn sorted_with_row_ids(table: &Table, positions: &[usize], id_name: &str) -> Result<Table> {
    row_id_to_i32(table.row_count())?;
    let ids: Vec<usize> = (0..table.row_count()).collect();
    let mut working = table.clone();
    working.add_column(Column::row_ids(id_name, &ids))?;
    let comparator = RowComparatorChain::for_sort(&working, positions)?;
    working.sorted_by(|&a, &b| comparator.compare(a, b))
}

fn row_id_at(sorted: &Table, row: usize) -> Result<usize> {
    let id_column = sorted.column_count() - 1;
    match sorted.column(id_column).map(|c| c.value_at(row)).transpose()? {
        Some(Value::Integer(id)) => row_id_from_i32(id),
        other => Err(ColtabError::internal(format!(
            "row {row} of '{}' has no row id (found {other:?})",
            sorted.name()
        ))),
    }
}

/// Run the sort-merge strategy.
///
/// # Errors
///
/// Only structural errors; inputs are validated by the caller.
pub fn sort_merge_join(plan: &JoinPlan<'_>, schema: ResultSchema) -> Result<Table> {
    let JoinPlan {
        left,
        right,
        key,
        join_type,
        keep_all_join_key_columns,
        missing_keys_match,
    } = *plan;

    let left_sorted = sorted_with_row_ids(left, &key.left_positions(), LEFT_ROW_ID)?;
    let right_sorted = sorted_with_row_ids(right, &key.right_positions(), RIGHT_ROW_ID)?;
    tracing::debug!(
        left_rows = left.row_count(),
        right_rows = right.row_count(),
        "sort merge inputs sorted"
    );

    let comparator = RowComparatorChain::new(&left_sorted, &right_sorted, key)?;
    let left_candidates: Vec<usize> = (0..left_sorted.row_count())
        .filter(|&r| missing_keys_match || !key.left_has_missing(&left_sorted, r))
        .collect();
    let right_candidates: Vec<usize> = (0..right_sorted.row_count())
        .filter(|&r| missing_keys_match || !key.right_has_missing(&right_sorted, r))
        .collect();

    let mut out = ResultBuilder::new(schema, key, keep_all_join_key_columns).with_row_ids();
    let mut scan = MergeScan::new(&left_candidates, &right_candidates, |l, r| {
        comparator.compare(l, r)
    });
    for (l, r) in scan.by_ref() {
        out.push_pair(&left_sorted, l, &right_sorted, r)?;
        out.push_row_ids(
            Some(row_id_at(&left_sorted, l)?),
            Some(row_id_at(&right_sorted, r)?),
        )?;
    }
    let replays = scan.replays();
    let matched_rows = out.rows();
    tracing::debug!(matched_rows, group_replays = replays, "merge pass complete");

    let mut unmatched = 0_usize;
    if join_type.keeps_unmatched_left() {
        let present = out.present_row_ids(Side::Left)?;
        let missing = Selection::with_range(0..left.row_count()).and_not(&present);
        for id in &missing {
            out.push_left_only(left, id)?;
            out.push_row_ids(Some(id), None)?;
        }
        unmatched += missing.len();
    }
    if join_type.keeps_unmatched_right() {
        let present = out.present_row_ids(Side::Right)?;
        let missing = Selection::with_range(0..right.row_count()).and_not(&present);
        for id in &missing {
            out.push_right_only(right, id)?;
            out.push_row_ids(None, Some(id))?;
        }
        unmatched += missing.len();
    }

    record_group_replays(replays);
    record_unmatched_rows(unmatched);
    tracing::debug!(unmatched_rows = unmatched, "unmatched pass complete");
    out.finish()
}
