//! Composite key comparator.
//!
//! A [`RowComparatorChain`] is built once per join from a [`JoinKey`]. Each
//! link borrows the two key buffers directly, so comparing rows never boxes
//! values or re-dispatches on column type beyond one enum match.

use std::cmp::Ordering;

use smallvec::SmallVec;

use coltab_error::{ColtabError, Result};
use coltab_types::ordering::{cmp_f32, cmp_f64, cmp_missing_first};
use coltab_types::{Column, ColumnData, Table};

use crate::key::JoinKey;

/// Single-column comparator over a left and a right buffer.
#[derive(Debug, Clone, Copy)]
enum KeyComparator<'a> {
    Byte(&'a [Option<i8>], &'a [Option<i8>]),
    Short(&'a [Option<i16>], &'a [Option<i16>]),
    Int(&'a [Option<i32>], &'a [Option<i32>]),
    Long(&'a [Option<i64>], &'a [Option<i64>]),
    Float(&'a [Option<f32>], &'a [Option<f32>]),
    Double(&'a [Option<f64>], &'a [Option<f64>]),
    Str(&'a [Option<String>], &'a [Option<String>]),
}

impl<'a> KeyComparator<'a> {
    fn new(left: &'a Column, right: &'a Column) -> Result<Self> {
        for column in [left, right] {
            if !column.column_type().is_joinable() {
                return Err(ColtabError::UnsupportedKeyType {
                    column: column.name().to_owned(),
                    column_type: column.column_type().to_string(),
                });
            }
        }
        Ok(match (left.data(), right.data()) {
            (ColumnData::Byte(a), ColumnData::Byte(b)) => Self::Byte(a, b),
            (ColumnData::Short(a), ColumnData::Short(b)) => Self::Short(a, b),
            (ColumnData::Int(a), ColumnData::Int(b)) => Self::Int(a, b),
            (ColumnData::Long(a), ColumnData::Long(b)) => Self::Long(a, b),
            (ColumnData::Float(a), ColumnData::Float(b)) => Self::Float(a, b),
            (ColumnData::Double(a), ColumnData::Double(b)) => Self::Double(a, b),
            (ColumnData::Str(a), ColumnData::Str(b)) => Self::Str(a, b),
            _ => {
                return Err(ColtabError::IncompatibleKeyTypes {
                    left_column: left.name().to_owned(),
                    left_type: left.column_type().to_string(),
                    right_column: right.name().to_owned(),
                    right_type: right.column_type().to_string(),
                });
            }
        })
    }

    #[inline]
    fn compare(&self, l: usize, r: usize) -> Ordering {
        match *self {
            Self::Byte(a, b) => cmp_missing_first(a[l], b[r], |x, y| x.cmp(&y)),
            Self::Short(a, b) => cmp_missing_first(a[l], b[r], |x, y| x.cmp(&y)),
            Self::Int(a, b) => cmp_missing_first(a[l], b[r], |x, y| x.cmp(&y)),
            Self::Long(a, b) => cmp_missing_first(a[l], b[r], |x, y| x.cmp(&y)),
            Self::Float(a, b) => cmp_missing_first(a[l], b[r], cmp_f32),
            Self::Double(a, b) => cmp_missing_first(a[l], b[r], cmp_f64),
            Self::Str(a, b) => cmp_missing_first(a[l].as_deref(), b[r].as_deref(), |x, y| x.cmp(y)),
        }
    }
}

/// Ascending total order over composite keys of two tables.
#[derive(Debug, Clone)]
pub struct RowComparatorChain<'a> {
    links: SmallVec<[KeyComparator<'a>; 4]>,
}

impl<'a> RowComparatorChain<'a> {
    /// Comparator from rows of `left` to rows of `right`.
    ///
    /// # Errors
    ///
    /// Fails on construction, never on use: [`ColtabError::UnsupportedKeyType`]
    /// for a key type without a comparator and
    /// [`ColtabError::IncompatibleKeyTypes`] for pairs of different
    /// representations.
    pub fn new(left: &'a Table, right: &'a Table, key: &JoinKey) -> Result<Self> {
        let mut links = SmallVec::with_capacity(key.len());
        for pair in key.pairs() {
            let l = left.column(pair.left).ok_or_else(|| {
                ColtabError::internal(format!("left key position {} out of range", pair.left))
            })?;
            let r = right.column(pair.right).ok_or_else(|| {
                ColtabError::internal(format!("right key position {} out of range", pair.right))
            })?;
            links.push(KeyComparator::new(l, r)?);
        }
        Ok(Self { links })
    }

    /// Comparator between rows of one table, for sorting it on `positions`.
    ///
    /// # Errors
    ///
    /// Same as [`RowComparatorChain::new`].
    pub fn for_sort(table: &'a Table, positions: &[usize]) -> Result<Self> {
        let mut links = SmallVec::with_capacity(positions.len());
        for &p in positions {
            let column = table.column(p).ok_or_else(|| {
                ColtabError::internal(format!("sort position {p} out of range"))
            })?;
            links.push(KeyComparator::new(column, column)?);
        }
        Ok(Self { links })
    }

    /// First non-equal link decides; equal only if every link is equal.
    #[must_use]
    pub fn compare(&self, left_row: usize, right_row: usize) -> Ordering {
        for link in &self.links {
            let ord = link.compare(left_row, right_row);
            if ord.is_ne() {
                return ord;
            }
        }
        Ordering::Equal
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Table, Table) {
        let a = Table::create(
            "a",
            vec![
                Column::strings("name", [Some("ann"), Some("bob"), None]),
                Column::doubles("score", [Some(1.0), Some(-0.0), Some(2.0)]),
            ],
        )
        .unwrap();
        let b = Table::create(
            "b",
            vec![
                Column::strings("who", [Some("ann"), Some("bob"), Some("bob")]),
                Column::doubles("pts", [Some(1.0), Some(0.0), Some(5.0)]),
            ],
        )
        .unwrap();
        (a, b)
    }

    #[test]
    fn chain_returns_first_non_equal_link() {
        let (a, b) = pair();
        let key = JoinKey::from_positions(&a, &b, &[0, 1], &[0, 1]).unwrap();
        let cmp = RowComparatorChain::new(&a, &b, &key).unwrap();
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp.compare(0, 0), Ordering::Equal, "case=full_match");
        assert_eq!(cmp.compare(1, 1), Ordering::Equal, "case=signed_zero");
        assert_eq!(cmp.compare(1, 2), Ordering::Less, "case=second_link");
        assert_eq!(cmp.compare(1, 0), Ordering::Greater, "case=first_link");
        assert_eq!(cmp.compare(2, 0), Ordering::Less, "case=missing_first");
    }

    #[test]
    fn unsupported_types_fail_at_construction() {
        let t = Table::create("t", vec![Column::texts("body", [Some("x")])]).unwrap();
        let err = RowComparatorChain::for_sort(&t, &[0]).unwrap_err();
        assert!(
            matches!(err, ColtabError::UnsupportedKeyType { .. }),
            "case=text_comparator err={err}"
        );
    }

    #[test]
    fn sort_comparator_orders_one_table() {
        let (a, _) = pair();
        let cmp = RowComparatorChain::for_sort(&a, &[1]).unwrap();
        let sorted = a.sorted_by(|&x, &y| cmp.compare(x, y)).unwrap();
        let scores: Vec<String> = (0..3)
            .map(|r| sorted.column(1).unwrap().value_at(r).unwrap().to_string())
            .collect();
        assert_eq!(scores, vec!["-0", "1", "2"]);
    }
}
