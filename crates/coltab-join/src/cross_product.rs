//! Index-accelerated cross-product join.
//!
//! Every key column on both sides gets a [`ReverseIndex`]. Rows of the
//! driving table are visited in order; for each row not already covered by
//! an earlier group, the lookups of all key columns are intersected on both
//! sides to find the full match group, whose Cartesian product is written
//! out. Unmatched right rows are the complement of the rows ever matched.

use std::borrow::Cow;

use coltab_error::{ColtabError, Result};
use coltab_index::ReverseIndex;
use coltab_types::{Column, Selection, Table};
use smallvec::SmallVec;

use crate::instrumentation::{record_index_lookups, record_unmatched_rows};
use crate::join_type::JoinType;
use crate::output::ResultBuilder;
use crate::plan::JoinPlan;
use crate::schema::ResultSchema;

// ── Probe helpers ──────────────────────────────────────────────────────────

fn key_columns<'t>(table: &'t Table, positions: &[usize]) -> Result<Vec<&'t Column>> {
    positions
        .iter()
        .map(|&p| {
            table.column(p).ok_or_else(|| {
                ColtabError::internal(format!("key position {p} missing from '{}'", table.name()))
            })
        })
        .collect()
}

fn build_indexes(columns: &[&Column]) -> Result<Vec<ReverseIndex>> {
    columns.iter().map(|c| ReverseIndex::build(c)).collect()
}

/// Rows of the indexed table whose composite key equals the probe row's.
///
/// Groups are intersected smallest first; a single-column key borrows the
/// index's own selection.
fn matching_rows<'i>(
    indexes: &'i [ReverseIndex],
    probe: &[&Column],
    row: usize,
) -> Result<Cow<'i, Selection>> {
    let mut groups: SmallVec<[&Selection; 4]> = SmallVec::with_capacity(indexes.len());
    for (index, column) in indexes.iter().zip(probe) {
        match index.lookup_row(column, row)? {
            Some(found) => groups.push(found),
            None => return Ok(Cow::Owned(Selection::new())),
        }
    }
    groups.sort_by_key(|rows| rows.len());
    let Some((&first, rest)) = groups.split_first() else {
        return Ok(Cow::Owned(Selection::new()));
    };
    let mut rows = Cow::Borrowed(first);
    for group in rest {
        let narrowed = rows.and(group);
        let empty = narrowed.is_empty();
        rows = Cow::Owned(narrowed);
        if empty {
            break;
        }
    }
    Ok(rows)
}

// ── Strategy ───────────────────────────────────────────────────────────────

/// Run the cross-product strategy.
///
/// INNER joins drive from the smaller table; every other join type drives
/// from the left.
///
/// # Errors
///
/// Only structural errors; inputs are validated by the caller.
pub fn cross_product_join(plan: &JoinPlan<'_>, schema: ResultSchema) -> Result<Table> {
    let JoinPlan {
        left,
        right,
        key,
        join_type,
        keep_all_join_key_columns,
        missing_keys_match,
    } = *plan;
    let mut out = ResultBuilder::new(schema, key, keep_all_join_key_columns);

    let drive_right = join_type == JoinType::Inner && left.row_count() > right.row_count();
    let (drive, other) = if drive_right { (right, left) } else { (left, right) };
    if drive.row_count() == 0 && matches!(join_type, JoinType::Inner | JoinType::LeftOuter) {
        tracing::debug!(join_type = %join_type, "empty driving table, no rows to join");
        return out.finish();
    }

    let left_keys = key_columns(left, &key.left_positions())?;
    let right_keys = key_columns(right, &key.right_positions())?;
    let left_indexes = build_indexes(&left_keys)?;
    let right_indexes = build_indexes(&right_keys)?;
    let (drive_keys, drive_indexes, other_indexes) = if drive_right {
        (&right_keys, &right_indexes, &left_indexes)
    } else {
        (&left_keys, &left_indexes, &right_indexes)
    };
    tracing::debug!(
        drive_side = if drive_right { "right" } else { "left" },
        drive_rows = drive.row_count(),
        other_rows = other.row_count(),
        key_columns = key.len(),
        "cross product indexes built"
    );

    let mut done_drive = Selection::with_universe(drive.row_count());
    let mut done_other = Selection::with_universe(other.row_count());
    let mut lookups = 0_usize;
    let mut unmatched = 0_usize;

    for row in 0..drive.row_count() {
        if done_drive.contains(row) {
            continue;
        }
        let has_missing = if drive_right {
            key.right_has_missing(right, row)
        } else {
            key.left_has_missing(left, row)
        };
        let (drive_group, other_group) = if has_missing && !missing_keys_match {
            (
                Cow::Owned(Selection::from_rows([row])),
                Cow::Owned(Selection::new()),
            )
        } else {
            lookups += 2 * key.len();
            (
                matching_rows(drive_indexes, drive_keys, row)?,
                matching_rows(other_indexes, drive_keys, row)?,
            )
        };
        let (matched_drive, matched_other) = (&*drive_group, &*other_group);
        done_drive.or_assign(matched_drive);

        if matched_other.is_empty() {
            if !drive_right && join_type.keeps_unmatched_left() {
                for a in matched_drive {
                    out.push_left_only(left, a)?;
                    unmatched += 1;
                }
            }
        } else {
            done_other.or_assign(matched_other);
            let (matched_left, matched_right) = if drive_right {
                (matched_other, matched_drive)
            } else {
                (matched_drive, matched_other)
            };
            for a in matched_left {
                for b in matched_right {
                    out.push_pair(left, a, right, b)?;
                }
            }
        }

        if join_type == JoinType::Inner && done_other.len() == other.row_count() {
            tracing::trace!(row, "every row of the other side matched, stopping early");
            break;
        }
    }

    if !drive_right && join_type.keeps_unmatched_right() {
        let unmatched_right = done_other.flip(0..right.row_count());
        for b in &unmatched_right {
            out.push_right_only(right, b)?;
        }
        unmatched += unmatched_right.len();
    }

    record_index_lookups(lookups);
    record_unmatched_rows(unmatched);
    tracing::debug!(
        output_rows = out.rows(),
        unmatched_rows = unmatched,
        index_lookups = lookups,
        "cross product pass complete"
    );
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::JoinKey;
    use crate::schema::{SchemaOptions, build_schema};
    use coltab_types::Value;

    fn run(left: &Table, right: &Table, join_type: JoinType, missing_keys_match: bool) -> Table {
        let key = JoinKey::from_positions(left, right, &[0], &[0]).unwrap();
        let schema = build_schema(
            left,
            right,
            &key,
            SchemaOptions {
                join_type,
                allow_duplicate_column_names: true,
                keep_all_join_key_columns: false,
            },
            "T2",
        )
        .unwrap();
        let plan = JoinPlan {
            left,
            right,
            key: &key,
            join_type,
            keep_all_join_key_columns: false,
            missing_keys_match,
        };
        cross_product_join(&plan, schema).unwrap()
    }

    fn keyed(name: &str, keys: &[Option<i32>], tag: &str) -> Table {
        let tags: Vec<Option<String>> = (0..keys.len()).map(|i| Some(format!("{tag}{i}"))).collect();
        Table::create(
            name,
            vec![
                Column::integers("k", keys.iter().copied()),
                Column::strings(tag, tags),
            ],
        )
        .unwrap()
    }

    #[test]
    fn inner_drives_from_smaller_side() {
        let big = keyed("big", &[Some(1), Some(2), Some(2), Some(3)], "a");
        let small = keyed("small", &[Some(2)], "b");
        let t = run(&big, &small, JoinType::Inner, false);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column_names(), vec!["k", "a", "b"]);
        let tags: Vec<Value> = (0..2).map(|r| t.column(1).unwrap().value_at(r).unwrap()).collect();
        assert_eq!(tags, vec![Value::from("a1"), Value::from("a2")]);
    }

    #[test]
    fn composite_duplicates_form_full_product() {
        let a = keyed("a", &[Some(7), Some(7), Some(8)], "a");
        let b = keyed("b", &[Some(7), Some(7), Some(7)], "b");
        let t = run(&a, &b, JoinType::Inner, false);
        assert_eq!(t.row_count(), 6, "case=two_by_three");
    }

    #[test]
    fn missing_keys_do_not_match_by_default() {
        let a = keyed("a", &[None, Some(1)], "a");
        let b = keyed("b", &[None, Some(1)], "b");
        assert_eq!(run(&a, &b, JoinType::Inner, false).row_count(), 1);
        assert_eq!(run(&a, &b, JoinType::Inner, true).row_count(), 2);

        let full = run(&a, &b, JoinType::FullOuter, false);
        assert_eq!(full.row_count(), 3, "case=missing_keys_unmatched_both_sides");
    }

    #[test]
    fn empty_driving_table_short_circuits() {
        let a = keyed("a", &[], "a");
        let b = keyed("b", &[Some(1), Some(2)], "b");
        let left = run(&a, &b, JoinType::LeftOuter, false);
        assert_eq!(left.row_count(), 0);
        assert_eq!(left.column_count(), 3);

        let full = run(&a, &b, JoinType::FullOuter, false);
        assert_eq!(full.row_count(), 2);
        assert_eq!(full.row_values(0).unwrap()[0], Value::Integer(1));
        assert!(full.column(1).unwrap().is_missing(1));
    }

    #[test]
    fn large_driving_table_against_small_right_side() {
        let n = 100_000_i32;
        let keys: Vec<Option<i32>> = (0..n).map(Some).collect();
        let a = Table::create("a", vec![Column::integers("k", keys.iter().copied())]).unwrap();
        let b = keyed("b", &[Some(7), Some(n - 1), Some(n + 5)], "b");
        let t = run(&a, &b, JoinType::FullOuter, false);
        assert_eq!(t.row_count(), 100_001, "case=every_left_row_plus_one_right_only");
        let matched = (0..t.row_count())
            .filter(|&r| !t.column(1).unwrap().is_missing(r))
            .count();
        assert_eq!(matched, 3, "case=two_matches_and_one_right_only");
        assert_eq!(
            t.row_values(t.row_count() - 1).unwrap(),
            vec![Value::Integer(n + 5), Value::from("b2")]
        );
    }

    #[test]
    fn right_outer_emits_unmatched_right_rows() {
        let a = keyed("a", &[Some(1), Some(2)], "a");
        let b = keyed("b", &[Some(2), Some(3), Some(3)], "b");
        let t = run(&a, &b, JoinType::RightOuter, false);
        assert_eq!(t.column_names(), vec!["a", "k", "b"]);
        assert_eq!(t.row_count(), 3);
        assert_eq!(
            t.row_values(2).unwrap(),
            vec![Value::Missing, Value::Integer(3), Value::from("b2")]
        );
    }
}
