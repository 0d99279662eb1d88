//! Typed, named column buffers.
//!
//! A [`Column`] pairs a logical [`ColumnType`] with a [`ColumnData`] buffer
//! in the type's [`Representation`]. Columns of congruent types (for example
//! `INTEGER` and `LOCAL_DATE`) share a buffer variant, so values can move
//! between them with [`Column::append_from`].

use coltab_error::{ColtabError, Result};

use crate::column_type::{ColumnType, Representation};
use crate::selection::Selection;
use crate::value::Value;

/// Storage buffer for one column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Booleans, stored as `1` / `0`.
    Byte(Vec<Option<i8>>),
    Short(Vec<Option<i16>>),
    Int(Vec<Option<i32>>),
    Long(Vec<Option<i64>>),
    Float(Vec<Option<f32>>),
    Double(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
}

/// Apply `$body` to the vector inside any [`ColumnData`] variant.
macro_rules! with_values {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Byte($v) => $body,
            ColumnData::Short($v) => $body,
            ColumnData::Int($v) => $body,
            ColumnData::Long($v) => $body,
            ColumnData::Float($v) => $body,
            ColumnData::Double($v) => $body,
            ColumnData::Str($v) => $body,
        }
    };
}

impl ColumnData {
    /// Empty buffer for `representation`.
    #[must_use]
    pub fn empty(representation: Representation) -> Self {
        Self::with_capacity(representation, 0)
    }

    #[must_use]
    pub fn with_capacity(representation: Representation, capacity: usize) -> Self {
        match representation {
            Representation::Byte => Self::Byte(Vec::with_capacity(capacity)),
            Representation::Short => Self::Short(Vec::with_capacity(capacity)),
            Representation::Int => Self::Int(Vec::with_capacity(capacity)),
            Representation::Long => Self::Long(Vec::with_capacity(capacity)),
            Representation::Float => Self::Float(Vec::with_capacity(capacity)),
            Representation::Double => Self::Double(Vec::with_capacity(capacity)),
            Representation::Str => Self::Str(Vec::with_capacity(capacity)),
        }
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

    #[must_use]
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_missing(&self, row: usize) -> bool {
        with_values!(self, v => v.get(row).is_none_or(Option::is_none))
    }

    fn push_missing(&mut self) {
        with_values!(self, v => v.push(None));
    }
}

/// A named, typed sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    data: ColumnData,
}

impl Column {
    /// Empty column of the given type.
    #[must_use]
    pub fn empty(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            data: ColumnData::empty(column_type.representation()),
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RepresentationMismatch`] when the buffer variant
    /// does not match `column_type`.
    pub fn from_data(
        name: impl Into<String>,
        column_type: ColumnType,
        data: ColumnData,
    ) -> Result<Self> {
        if data.representation() != column_type.representation() {
            return Err(ColtabError::RepresentationMismatch {
                expected: column_type.representation().to_string(),
                found: data.representation().to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            column_type,
            data,
        })
    }

    pub fn booleans<I: IntoIterator<Item = Option<bool>>>(name: impl Into<String>, values: I) -> Self {
        let data = values.into_iter().map(|v| v.map(i8::from)).collect();
        Self::typed(name, ColumnType::Boolean, ColumnData::Byte(data))
    }

    pub fn shorts<I: IntoIterator<Item = Option<i16>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Short, ColumnData::Short(values.into_iter().collect()))
    }

    pub fn integers<I: IntoIterator<Item = Option<i32>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Integer, ColumnData::Int(values.into_iter().collect()))
    }

    pub fn longs<I: IntoIterator<Item = Option<i64>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Long, ColumnData::Long(values.into_iter().collect()))
    }

    pub fn floats<I: IntoIterator<Item = Option<f32>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Float, ColumnData::Float(values.into_iter().collect()))
    }

    pub fn doubles<I: IntoIterator<Item = Option<f64>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Double, ColumnData::Double(values.into_iter().collect()))
    }

    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let data = values.into_iter().map(|v| v.map(Into::into)).collect();
        Self::typed(name, ColumnType::String, ColumnData::Str(data))
    }

    pub fn texts<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let data = values.into_iter().map(|v| v.map(Into::into)).collect();
        Self::typed(name, ColumnType::Text, ColumnData::Str(data))
    }

    /// Packed dates, see [`crate::packed::pack_date`].
    pub fn dates<I: IntoIterator<Item = Option<i32>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::LocalDate, ColumnData::Int(values.into_iter().collect()))
    }

    /// Packed times, see [`crate::packed::pack_time`].
    pub fn times<I: IntoIterator<Item = Option<i32>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::LocalTime, ColumnData::Int(values.into_iter().collect()))
    }

    /// Packed date-times, see [`crate::packed::pack_date_time`].
    pub fn date_times<I: IntoIterator<Item = Option<i64>>>(
        name: impl Into<String>,
        values: I,
    ) -> Self {
        Self::typed(
            name,
            ColumnType::LocalDateTime,
            ColumnData::Long(values.into_iter().collect()),
        )
    }

    /// Epoch milliseconds.
    pub fn instants<I: IntoIterator<Item = Option<i64>>>(name: impl Into<String>, values: I) -> Self {
        Self::typed(name, ColumnType::Instant, ColumnData::Long(values.into_iter().collect()))
    }

    /// Integer row positions `0..len`, used as a synthetic row id.
    #[must_use]
    pub fn row_ids(name: impl Into<String>, rows: &[usize]) -> Self {
        let data = rows.iter().map(|&r| i32::try_from(r).ok()).collect();
        Self::typed(name, ColumnType::Integer, ColumnData::Int(data))
    }

    fn typed(name: impl Into<String>, column_type: ColumnType, data: ColumnData) -> Self {
        debug_assert_eq!(data.representation(), column_type.representation());
        Self {
            name: name.into(),
            column_type,
            data,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        self.column_type
    }

    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn is_missing(&self, row: usize) -> bool {
        self.data.is_missing(row)
    }

    #[must_use]
    pub fn count_missing(&self) -> usize {
        with_values!(&self.data, v => v.iter().filter(|x| x.is_none()).count())
    }

    /// Same name and type, zero rows.
    #[must_use]
    pub fn empty_copy(&self) -> Self {
        Self::empty(self.name.clone(), self.column_type)
    }

    /// Read the value at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] if `row >= len`.
    pub fn value_at(&self, row: usize) -> Result<Value> {
        let len = self.len();
        if row >= len {
            return Err(ColtabError::RowOutOfRange { row, len });
        }
        let value = match (&self.data, self.column_type) {
            (ColumnData::Byte(v), _) => v[row].map(|b| Value::Boolean(b != 0)),
            (ColumnData::Short(v), _) => v[row].map(Value::Short),
            (ColumnData::Int(v), ColumnType::LocalDate) => v[row].map(Value::LocalDate),
            (ColumnData::Int(v), ColumnType::LocalTime) => v[row].map(Value::LocalTime),
            (ColumnData::Int(v), _) => v[row].map(Value::Integer),
            (ColumnData::Long(v), ColumnType::LocalDateTime) => v[row].map(Value::LocalDateTime),
            (ColumnData::Long(v), ColumnType::Instant) => v[row].map(Value::Instant),
            (ColumnData::Long(v), _) => v[row].map(Value::Long),
            (ColumnData::Float(v), _) => v[row].map(Value::Float),
            (ColumnData::Double(v), _) => v[row].map(Value::Double),
            (ColumnData::Str(v), ColumnType::Text) => v[row].clone().map(Value::Text),
            (ColumnData::Str(v), _) => v[row].clone().map(Value::String),
        };
        Ok(value.unwrap_or(Value::Missing))
    }

    /// Append the value found at `row` of `other`.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] for a bad row and
    /// [`ColtabError::RepresentationMismatch`] when the buffers differ.
    pub fn append_from(&mut self, other: &Self, row: usize) -> Result<()> {
        let len = other.len();
        if row >= len {
            return Err(ColtabError::RowOutOfRange { row, len });
        }
        match (&mut self.data, &other.data) {
            (ColumnData::Byte(dst), ColumnData::Byte(src)) => dst.push(src[row]),
            (ColumnData::Short(dst), ColumnData::Short(src)) => dst.push(src[row]),
            (ColumnData::Int(dst), ColumnData::Int(src)) => dst.push(src[row]),
            (ColumnData::Long(dst), ColumnData::Long(src)) => dst.push(src[row]),
            (ColumnData::Float(dst), ColumnData::Float(src)) => dst.push(src[row]),
            (ColumnData::Double(dst), ColumnData::Double(src)) => dst.push(src[row]),
            (ColumnData::Str(dst), ColumnData::Str(src)) => dst.push(src[row].clone()),
            (dst, src) => {
                return Err(ColtabError::RepresentationMismatch {
                    expected: dst.representation().to_string(),
                    found: src.representation().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn append_missing(&mut self) {
        self.data.push_missing();
    }

    /// Append an owned value.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RepresentationMismatch`] when the value's type
    /// is not congruent with this column.
    pub fn append_value(&mut self, value: &Value) -> Result<()> {
        match (&mut self.data, value) {
            (data, Value::Missing) => data.push_missing(),
            (ColumnData::Byte(v), Value::Boolean(b)) => v.push(Some(i8::from(*b))),
            (ColumnData::Short(v), Value::Short(x)) => v.push(Some(*x)),
            (
                ColumnData::Int(v),
                Value::Integer(x) | Value::LocalDate(x) | Value::LocalTime(x),
            ) => v.push(Some(*x)),
            (
                ColumnData::Long(v),
                Value::Long(x) | Value::LocalDateTime(x) | Value::Instant(x),
            ) => v.push(Some(*x)),
            (ColumnData::Float(v), Value::Float(x)) => v.push(Some(*x)),
            (ColumnData::Double(v), Value::Double(x)) => v.push(Some(*x)),
            (ColumnData::Str(v), Value::String(s) | Value::Text(s)) => v.push(Some(s.clone())),
            (data, other) => {
                return Err(ColtabError::RepresentationMismatch {
                    expected: data.representation().to_string(),
                    found: other
                        .column_type()
                        .map_or("missing", |t| t.representation().as_str())
                        .to_owned(),
                });
            }
        }
        Ok(())
    }

    /// New column holding the values at `rows`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ColtabError::RowOutOfRange`] if any row is out of bounds.
    pub fn gather(&self, rows: &[usize]) -> Result<Self> {
        let mut out = Self {
            name: self.name.clone(),
            column_type: self.column_type,
            data: ColumnData::with_capacity(self.column_type.representation(), rows.len()),
        };
        for &row in rows {
            out.append_from(self, row)?;
        }
        Ok(out)
    }

    /// Rows whose value is missing.
    #[must_use]
    pub fn missing_rows(&self) -> Selection {
        (0..self.len()).filter(|&r| self.is_missing(r)).collect()
    }
}
