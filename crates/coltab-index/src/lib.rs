//! Per-column reverse indexes.
//!
//! A [`ReverseIndex`] maps each distinct value of one column to the
//! [`Selection`] of rows holding it. One variant exists per storage
//! [`Representation`]; numeric and temporal indexes are ordered and also
//! answer range lookups, string indexes answer exact lookups only.
//! Missing cells are kept apart from the value map.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use coltab_error::{ColtabError, Result};
use coltab_types::ordering::{canonical_f32, canonical_f64, cmp_f32, cmp_f64};
use coltab_types::{Column, ColumnData, ColumnType, Representation, Selection, Value};
use hashbrown::HashMap;

// ── Float keys ─────────────────────────────────────────────────────────────

/// `f32` key with canonical zero/NaN and total order.
#[derive(Debug, Clone, Copy)]
pub struct F32Key(f32);

/// `f64` key with canonical zero/NaN and total order.
#[derive(Debug, Clone, Copy)]
pub struct F64Key(f64);

impl F32Key {
    #[must_use]
    pub fn new(v: f32) -> Self {
        Self(canonical_f32(v))
    }
}

impl F64Key {
    #[must_use]
    pub fn new(v: f64) -> Self {
        Self(canonical_f64(v))
    }
}

impl PartialEq for F32Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}
impl Eq for F32Key {}
impl PartialOrd for F32Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for F32Key {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f32(self.0, other.0)
    }
}

impl PartialEq for F64Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}
impl Eq for F64Key {}
impl PartialOrd for F64Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for F64Key {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.0, other.0)
    }
}

// ── Ordered index ──────────────────────────────────────────────────────────

/// Sorted value → rows map for keys with a total order.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K> {
    map: BTreeMap<K, Selection>,
    missing: Selection,
}

impl<K: Ord + Copy> OrderedIndex<K> {
    fn build<T: Copy>(values: &[Option<T>], key: impl Fn(T) -> K) -> Self {
        let mut map: BTreeMap<K, Selection> = BTreeMap::new();
        let mut missing = Selection::new();
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(v) => {
                    map.entry(key(*v)).or_default().insert(row);
                }
                None => {
                    missing.insert(row);
                }
            }
        }
        Self { map, missing }
    }

    /// Rows equal to `key`; `None` means no row holds it.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&Selection> {
        self.map.get(&key)
    }

    fn probe(&self, key: Option<K>) -> Option<&Selection> {
        match key {
            Some(k) => self.map.get(&k),
            None if self.missing.is_empty() => None,
            None => Some(&self.missing),
        }
    }

    fn union_range(&self, lower: Bound<K>, upper: Bound<K>) -> Selection {
        self.map
            .range((lower, upper))
            .flat_map(|(_, rows)| rows.iter())
            .collect()
    }

    #[must_use]
    pub fn at_least(&self, key: K) -> Selection {
        self.union_range(Bound::Included(key), Bound::Unbounded)
    }

    #[must_use]
    pub fn greater_than(&self, key: K) -> Selection {
        self.union_range(Bound::Excluded(key), Bound::Unbounded)
    }

    #[must_use]
    pub fn at_most(&self, key: K) -> Selection {
        self.union_range(Bound::Unbounded, Bound::Included(key))
    }

    #[must_use]
    pub fn less_than(&self, key: K) -> Selection {
        self.union_range(Bound::Unbounded, Bound::Excluded(key))
    }

    fn distinct(&self) -> usize {
        self.map.len()
    }
}

// ── String index ───────────────────────────────────────────────────────────

/// Hashed string → rows map. Exact lookups only.
#[derive(Debug, Clone, Default)]
pub struct StringIndex {
    map: HashMap<String, Selection>,
    missing: Selection,
}

impl StringIndex {
    fn build(values: &[Option<String>]) -> Self {
        let mut index = Self::default();
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(v) => {
                    index.map.entry_ref(v.as_str()).or_default().insert(row);
                }
                None => {
                    index.missing.insert(row);
                }
            }
        }
        index
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Selection> {
        self.map.get(key)
    }

    fn probe(&self, key: Option<&str>) -> Option<&Selection> {
        match key {
            Some(k) => self.map.get(k),
            None if self.missing.is_empty() => None,
            None => Some(&self.missing),
        }
    }
}

// ── Reverse index ──────────────────────────────────────────────────────────

/// Reverse index over one column.
#[derive(Debug, Clone)]
pub enum ReverseIndex {
    Byte(OrderedIndex<i8>),
    Short(OrderedIndex<i16>),
    Int(OrderedIndex<i32>),
    Long(OrderedIndex<i64>),
    Float(OrderedIndex<F32Key>),
    Double(OrderedIndex<F64Key>),
    Str(StringIndex),
}

/// Dispatch a range lookup to the ordered index matching `value`.
macro_rules! range_lookup {
    ($self:ident, $value:ident, $method:ident) => {
        match ($self, $value) {
            (Self::Byte(ix), Value::Boolean(b)) => Ok(ix.$method(i8::from(*b))),
            (Self::Short(ix), Value::Short(v)) => Ok(ix.$method(*v)),
            (
                Self::Int(ix),
                Value::Integer(v) | Value::LocalDate(v) | Value::LocalTime(v),
            ) => Ok(ix.$method(*v)),
            (
                Self::Long(ix),
                Value::Long(v) | Value::LocalDateTime(v) | Value::Instant(v),
            ) => Ok(ix.$method(*v)),
            (Self::Float(ix), Value::Float(v)) => Ok(ix.$method(F32Key::new(*v))),
            (Self::Double(ix), Value::Double(v)) => Ok(ix.$method(F64Key::new(*v))),
            (Self::Str(_), Value::String(_)) => Err(ColtabError::UnsupportedKeyType {
                column: String::new(),
                column_type: format!("{} (range lookup)", ColumnType::String),
            }),
            (_, Value::Missing) => Ok(Selection::new()),
            (ix, other) => Err(ix.mismatch(other)),
        }
    };
}

impl ReverseIndex {
    /// Index every row of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::UnsupportedKeyType`] for column types that are
    /// not joinable.
    pub fn build(column: &Column) -> Result<Self> {
        if !column.column_type().is_joinable() {
            return Err(ColtabError::UnsupportedKeyType {
                column: column.name().to_owned(),
                column_type: column.column_type().to_string(),
            });
        }
        let index = match column.data() {
            ColumnData::Byte(v) => Self::Byte(OrderedIndex::build(v, |x| x)),
            ColumnData::Short(v) => Self::Short(OrderedIndex::build(v, |x| x)),
            ColumnData::Int(v) => Self::Int(OrderedIndex::build(v, |x| x)),
            ColumnData::Long(v) => Self::Long(OrderedIndex::build(v, |x| x)),
            ColumnData::Float(v) => Self::Float(OrderedIndex::build(v, F32Key::new)),
            ColumnData::Double(v) => Self::Double(OrderedIndex::build(v, F64Key::new)),
            ColumnData::Str(v) => Self::Str(StringIndex::build(v)),
        };
        tracing::trace!(
            column = column.name(),
            rows = column.len(),
            distinct = index.distinct_count(),
            "reverse index built"
        );
        Ok(index)
    }

    #[must_use]
    pub const fn representation(&self) -> Representation {
        match self {
            Self::Byte(_) => Representation::Byte,
            Self::Short(_) => Representation::Short,
            Self::Int(_) => Representation::Int,
            Self::Long(_) => Representation::Long,
            Self::Float(_) => Representation::Float,
            Self::Double(_) => Representation::Double,
            Self::Str(_) => Representation::Str,
        }
    }

    /// Number of distinct present values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        match self {
            Self::Byte(ix) => ix.distinct(),
            Self::Short(ix) => ix.distinct(),
            Self::Int(ix) => ix.distinct(),
            Self::Long(ix) => ix.distinct(),
            Self::Float(ix) => ix.distinct(),
            Self::Double(ix) => ix.distinct(),
            Self::Str(ix) => ix.map.len(),
        }
    }

    /// Rows whose cell is missing.
    #[must_use]
    pub fn missing(&self) -> &Selection {
        match self {
            Self::Byte(ix) => &ix.missing,
            Self::Short(ix) => &ix.missing,
            Self::Int(ix) => &ix.missing,
            Self::Long(ix) => &ix.missing,
            Self::Float(ix) => &ix.missing,
            Self::Double(ix) => &ix.missing,
            Self::Str(ix) => &ix.missing,
        }
    }

    /// Rows of the indexed column equal to `column[row]`.
    ///
    /// `column` may belong to another table as long as it shares this
    /// index's representation. A missing probe value returns the indexed
    /// column's missing rows. `Ok(None)` means no row matches.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] for a bad row and
    /// [`ColtabError::RepresentationMismatch`] for an incongruent column.
    pub fn lookup_row(&self, column: &Column, row: usize) -> Result<Option<&Selection>> {
        if row >= column.len() {
            return Err(ColtabError::RowOutOfRange {
                row,
                len: column.len(),
            });
        }
        let found = match (self, column.data()) {
            (Self::Byte(ix), ColumnData::Byte(v)) => ix.probe(v[row]),
            (Self::Short(ix), ColumnData::Short(v)) => ix.probe(v[row]),
            (Self::Int(ix), ColumnData::Int(v)) => ix.probe(v[row]),
            (Self::Long(ix), ColumnData::Long(v)) => ix.probe(v[row]),
            (Self::Float(ix), ColumnData::Float(v)) => ix.probe(v[row].map(F32Key::new)),
            (Self::Double(ix), ColumnData::Double(v)) => ix.probe(v[row].map(F64Key::new)),
            (Self::Str(ix), ColumnData::Str(v)) => ix.probe(v[row].as_deref()),
            (ix, data) => {
                return Err(ColtabError::RepresentationMismatch {
                    expected: ix.representation().to_string(),
                    found: data.representation().to_string(),
                });
            }
        };
        Ok(found)
    }

    /// Rows equal to `value`, as an owned selection.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RepresentationMismatch`] when `value` belongs
    /// to another representation.
    pub fn lookup(&self, value: &Value) -> Result<Selection> {
        let found = match (self, value) {
            (ix, Value::Missing) => Some(ix.missing()),
            (Self::Byte(ix), Value::Boolean(b)) => ix.get(i8::from(*b)),
            (Self::Short(ix), Value::Short(v)) => ix.get(*v),
            (Self::Int(ix), Value::Integer(v) | Value::LocalDate(v) | Value::LocalTime(v)) => {
                ix.get(*v)
            }
            (
                Self::Long(ix),
                Value::Long(v) | Value::LocalDateTime(v) | Value::Instant(v),
            ) => ix.get(*v),
            (Self::Float(ix), Value::Float(v)) => ix.get(F32Key::new(*v)),
            (Self::Double(ix), Value::Double(v)) => ix.get(F64Key::new(*v)),
            (Self::Str(ix), Value::String(s) | Value::Text(s)) => ix.get(s),
            (ix, other) => return Err(ix.mismatch(other)),
        };
        Ok(found.cloned().unwrap_or_default())
    }

    /// Present rows `>= value`.
    ///
    /// # Errors
    ///
    /// Fails for string indexes and incongruent values.
    pub fn at_least(&self, value: &Value) -> Result<Selection> {
        range_lookup!(self, value, at_least)
    }

    /// Present rows `> value`.
    ///
    /// # Errors
    ///
    /// Fails for string indexes and incongruent values.
    pub fn greater_than(&self, value: &Value) -> Result<Selection> {
        range_lookup!(self, value, greater_than)
    }

    /// Present rows `<= value`.
    ///
    /// # Errors
    ///
    /// Fails for string indexes and incongruent values.
    pub fn at_most(&self, value: &Value) -> Result<Selection> {
        range_lookup!(self, value, at_most)
    }

    /// Present rows `< value`.
    ///
    /// # Errors
    ///
    /// Fails for string indexes and incongruent values.
    pub fn less_than(&self, value: &Value) -> Result<Selection> {
        range_lookup!(self, value, less_than)
    }

    fn mismatch(&self, value: &Value) -> ColtabError {
        ColtabError::RepresentationMismatch {
            expected: self.representation().to_string(),
            found: value
                .column_type()
                .map_or("missing", |t| t.representation().as_str())
                .to_owned(),
        }
    }
}
