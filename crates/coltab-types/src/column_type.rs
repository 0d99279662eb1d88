//! Column type tags and their storage representations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Boolean,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    /// Free-form text. Stored like `String` but never indexed, so it cannot
    /// be used as a join key.
    Text,
    LocalDate,
    LocalTime,
    LocalDateTime,
    Instant,
}

/// Physical storage class shared by congruent column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Str,
}

impl ColumnType {
    /// Every supported type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Boolean,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Text,
        Self::LocalDate,
        Self::LocalTime,
        Self::LocalDateTime,
        Self::Instant,
    ];

    #[must_use]
    pub const fn representation(self) -> Representation {
        match self {
            Self::Boolean => Representation::Byte,
            Self::Short => Representation::Short,
            Self::Integer | Self::LocalDate | Self::LocalTime => Representation::Int,
            Self::Long | Self::LocalDateTime | Self::Instant => Representation::Long,
            Self::Float => Representation::Float,
            Self::Double => Representation::Double,
            Self::String | Self::Text => Representation::Str,
        }
    }

    /// Whether a reverse index and key comparator exist for this type.
    #[must_use]
    pub const fn is_joinable(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Two key columns can be joined when both are joinable and share a
    /// representation.
    #[must_use]
    pub fn is_congruent_with(self, other: Self) -> bool {
        self.is_joinable() && other.is_joinable() && self.representation() == other.representation()
    }

    /// Stable label used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Short => "SHORT",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::String => "STRING",
            Self::Text => "TEXT",
            Self::LocalDate => "LOCAL_DATE",
            Self::LocalTime => "LOCAL_TIME",
            Self::LocalDateTime => "LOCAL_DATE_TIME",
            Self::Instant => "INSTANT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Representation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Str => "string",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporal_types_share_integer_representations() {
        assert!(ColumnType::LocalDate.is_congruent_with(ColumnType::Integer));
        assert!(ColumnType::Instant.is_congruent_with(ColumnType::LocalDateTime));
        assert!(!ColumnType::Integer.is_congruent_with(ColumnType::Long));
        assert!(!ColumnType::Float.is_congruent_with(ColumnType::Double));
    }

    #[test]
    fn text_is_never_joinable() {
        assert!(!ColumnType::Text.is_joinable());
        assert!(!ColumnType::Text.is_congruent_with(ColumnType::String));
        assert!(!ColumnType::String.is_congruent_with(ColumnType::Text));
        let joinable = ColumnType::ALL.iter().filter(|t| t.is_joinable()).count();
        assert_eq!(joinable, ColumnType::ALL.len() - 1);
    }

    #[test]
    fn serde_uses_screaming_labels() {
        let json = serde_json::to_string(&ColumnType::LocalDateTime).unwrap();
        assert_eq!(json, "\"LOCAL_DATE_TIME\"");
    }
}
