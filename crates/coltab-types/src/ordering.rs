//! Ascending cell ordering shared by sorting, indexing, and key comparison.
//!
//! Missing values sort before every present value. Floating-point values are
//! canonicalised first (`-0.0` becomes `0.0`, every NaN becomes the same
//! quiet NaN) and then ordered with IEEE total order, so "equal under the
//! comparator" and "same index key" always agree.

use std::cmp::Ordering;

use crate::column::ColumnData;

#[must_use]
pub fn canonical_f32(v: f32) -> f32 {
    if v.is_nan() {
        f32::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

#[must_use]
pub fn canonical_f64(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

#[must_use]
pub fn cmp_f32(a: f32, b: f32) -> Ordering {
    canonical_f32(a).total_cmp(&canonical_f32(b))
}

#[must_use]
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Order two optional cells, missing first.
#[inline]
pub fn cmp_missing_first<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp(a, b),
    }
}

/// Compare two rows of the same buffer.
#[must_use]
pub fn compare_rows(data: &ColumnData, a: usize, b: usize) -> Ordering {
    match data {
        ColumnData::Byte(v) => cmp_missing_first(v[a], v[b], |x, y| x.cmp(&y)),
        ColumnData::Short(v) => cmp_missing_first(v[a], v[b], |x, y| x.cmp(&y)),
        ColumnData::Int(v) => cmp_missing_first(v[a], v[b], |x, y| x.cmp(&y)),
        ColumnData::Long(v) => cmp_missing_first(v[a], v[b], |x, y| x.cmp(&y)),
        ColumnData::Float(v) => cmp_missing_first(v[a], v[b], cmp_f32),
        ColumnData::Double(v) => cmp_missing_first(v[a], v[b], cmp_f64),
        ColumnData::Str(v) => cmp_missing_first(v[a].as_deref(), v[b].as_deref(), |x, y| x.cmp(y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_signs_and_nans_collapse() {
        assert_eq!(cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(cmp_f64(f64::NAN, -f64::NAN), Ordering::Equal);
        assert_eq!(cmp_f32(-0.0, 0.0), Ordering::Equal);
        assert_eq!(cmp_f64(1.0, f64::NAN), Ordering::Less);
        assert_eq!(cmp_f64(f64::NEG_INFINITY, -1.0), Ordering::Less);
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn missing_sorts_first() {
        let data = ColumnData::Int(vec![Some(3), None, Some(-1)]);
        assert_eq!(compare_rows(&data, 1, 2), Ordering::Less);
        assert_eq!(compare_rows(&data, 0, 2), Ordering::Greater);
        assert_eq!(compare_rows(&data, 1, 1), Ordering::Equal);

        let strings = ColumnData::Str(vec![Some("b".into()), Some("a".into()), None]);
        assert_eq!(compare_rows(&strings, 1, 0), Ordering::Less);
        assert_eq!(compare_rows(&strings, 2, 1), Ordering::Less);
    }
}
