//! Owned cell values.

use std::fmt;

use crate::column_type::ColumnType;
use crate::packed::{unpack_date, unpack_date_time, unpack_time};

/// A single cell read out of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Boolean(bool),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Text(String),
    /// Packed date, see [`crate::packed::pack_date`].
    LocalDate(i32),
    /// Packed time, see [`crate::packed::pack_time`].
    LocalTime(i32),
    /// Packed date-time, see [`crate::packed::pack_date_time`].
    LocalDateTime(i64),
    /// Milliseconds since the Unix epoch.
    Instant(i64),
}

impl Value {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Column type this value belongs to; `None` for [`Value::Missing`].
    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        Some(match self {
            Self::Missing => return None,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Short(_) => ColumnType::Short,
            Self::Integer(_) => ColumnType::Integer,
            Self::Long(_) => ColumnType::Long,
            Self::Float(_) => ColumnType::Float,
            Self::Double(_) => ColumnType::Double,
            Self::String(_) => ColumnType::String,
            Self::Text(_) => ColumnType::Text,
            Self::LocalDate(_) => ColumnType::LocalDate,
            Self::LocalTime(_) => ColumnType::LocalTime,
            Self::LocalDateTime(_) => ColumnType::LocalDateTime,
            Self::Instant(_) => ColumnType::Instant,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) | Self::Instant(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) | Self::Text(v) => f.write_str(v),
            Self::LocalDate(v) => {
                let (y, m, d) = unpack_date(*v);
                write!(f, "{y:04}-{m:02}-{d:02}")
            }
            Self::LocalTime(v) => {
                let (h, m, s, ms) = unpack_time(*v);
                write!(f, "{h:02}:{m:02}:{s:02}.{ms:03}")
            }
            Self::LocalDateTime(v) => {
                let (date, time) = unpack_date_time(*v);
                write!(f, "{}T{}", Self::LocalDate(date), Self::LocalTime(time))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}
