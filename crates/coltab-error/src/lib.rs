//! Error types shared across the coltab workspace.
//!
//! Errors fall into two classes. Validation errors are raised before any row
//! is processed and are fixable by the caller. Structural errors mean an
//! index, comparator, or column was built inconsistently; they indicate a
//! defect and are never retried.

/// Result alias used by every coltab crate.
pub type Result<T> = std::result::Result<T, ColtabError>;

/// Workspace-wide error enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColtabError {
    // ── Validation ──────────────────────────────────────────────────────
    /// A column name did not resolve in the named table.
    #[error("column '{name}' not found in table '{table}'")]
    ColumnNotFound { table: String, name: String },

    /// A join was requested without any key columns.
    #[error("join requires at least one key column")]
    EmptyJoinKey,

    /// Left and right key lists have different lengths.
    #[error(
        "cannot join using a different number of key columns on each table: \
         left has {left}, right has {right}"
    )]
    KeyArityMismatch { left: usize, right: usize },

    /// A key column pair does not share a representation class.
    #[error(
        "cannot join key column '{left_column}' ({left_type}) with \
         '{right_column}' ({right_type}): incompatible key types"
    )]
    IncompatibleKeyTypes {
        left_column: String,
        left_type: String,
        right_column: String,
        right_type: String,
    },

    /// The column type has no registered index or comparator.
    #[error("joining attempted on unsupported column type {column_type} (column '{column}')")]
    UnsupportedKeyType { column: String, column_type: String },

    /// Two output columns would share a name and renaming is disabled.
    #[error(
        "column name '{name}' appears in both tables; enable duplicate column \
         names to alias it"
    )]
    DuplicateColumnName { name: String },

    /// A column's length disagrees with the table it is added to.
    #[error("column '{column}' has {actual} rows but the table has {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Join options failed their own consistency check.
    #[error("invalid join options: {0}")]
    InvalidOptions(String),

    // ── Structural ──────────────────────────────────────────────────────
    /// A row position outside `[0, len)` was referenced.
    #[error("row {row} out of range for {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    /// A value was moved between columns of different representations.
    #[error("representation mismatch: expected {expected}, found {found}")]
    RepresentationMismatch { expected: String, found: String },

    /// Catch-all for broken internal invariants.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ColtabError {
    /// True for errors the caller can fix by changing arguments.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ColumnNotFound { .. }
                | Self::EmptyJoinKey
                | Self::KeyArityMismatch { .. }
                | Self::IncompatibleKeyTypes { .. }
                | Self::UnsupportedKeyType { .. }
                | Self::DuplicateColumnName { .. }
                | Self::ColumnLengthMismatch { .. }
                | Self::InvalidOptions(_)
        )
    }

    /// True for errors that indicate an engine defect.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !self.is_validation()
    }

    /// Build a [`ColtabError::Internal`] from anything displayable.
    pub fn internal(msg: impl std::fmt::Display) -> Self {
        Self::Internal(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_exhaustive() {
        let validation = [
            ColtabError::EmptyJoinKey,
            ColtabError::KeyArityMismatch { left: 1, right: 2 },
            ColtabError::DuplicateColumnName { name: "x".into() },
            ColtabError::InvalidOptions("bad".into()),
        ];
        for err in &validation {
            assert!(err.is_validation(), "case=validation err={err}");
            assert!(!err.is_structural());
        }

        let structural = [
            ColtabError::RowOutOfRange { row: 9, len: 3 },
            ColtabError::internal("broken"),
        ];
        for err in &structural {
            assert!(err.is_structural(), "case=structural err={err}");
        }
    }

    #[test]
    fn messages_name_the_offending_column() {
        let err = ColtabError::UnsupportedKeyType {
            column: "notes".into(),
            column_type: "TEXT".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes"));
        assert!(msg.contains("TEXT"));
    }
}
