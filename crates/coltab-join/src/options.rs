//! Join configuration.

use serde::{Deserialize, Serialize};

use coltab_error::{ColtabError, Result};

use crate::join_type::JoinType;

/// Row count at which [`JoinStrategyKind::Auto`] switches to sort-merge.
pub const DEFAULT_SORT_MERGE_MIN_ROWS: usize = 4096;

/// Execution strategy for a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategyKind {
    /// Sort-merge when both inputs reach `sort_merge_min_rows`, otherwise
    /// cross product.
    #[default]
    Auto,
    CrossProduct,
    SortMerge,
}

impl JoinStrategyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::CrossProduct => "cross_product",
            Self::SortMerge => "sort_merge",
        }
    }
}

/// Options recognised by [`crate::join`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    pub join_type: JoinType,
    /// Alias colliding right-side names as `T<n>.<name>` instead of failing.
    pub allow_duplicate_column_names: bool,
    /// Keep both sides' key columns in the output.
    pub keep_all_join_key_columns: bool,
    pub strategy: JoinStrategyKind,
    /// Treat two missing key cells as equal. When false a key with any
    /// missing component matches nothing.
    pub missing_keys_match: bool,
    pub sort_merge_min_rows: usize,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            join_type: JoinType::Inner,
            allow_duplicate_column_names: false,
            keep_all_join_key_columns: false,
            strategy: JoinStrategyKind::Auto,
            missing_keys_match: false,
            sort_merge_min_rows: DEFAULT_SORT_MERGE_MIN_ROWS,
        }
    }
}

impl JoinOptions {
    #[must_use]
    pub fn new(join_type: JoinType) -> Self {
        Self {
            join_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: JoinStrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_duplicate_column_names(mut self, allow: bool) -> Self {
        self.allow_duplicate_column_names = allow;
        self
    }

    #[must_use]
    pub const fn with_all_join_key_columns(mut self, keep: bool) -> Self {
        self.keep_all_join_key_columns = keep;
        self
    }

    #[must_use]
    pub const fn with_missing_keys_match(mut self, matches: bool) -> Self {
        self.missing_keys_match = matches;
        self
    }

    /// Deserialize from JSON. Absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the JSON is malformed.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns [`ColtabError::InvalidOptions`] when `sort_merge_min_rows` is 0.
    pub fn validate(&self) -> Result<()> {
        if self.sort_merge_min_rows == 0 {
            return Err(ColtabError::InvalidOptions(
                "sort_merge_min_rows must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Concrete strategy for inputs of the given sizes.
    #[must_use]
    pub const fn resolve_strategy(&self, left_rows: usize, right_rows: usize) -> JoinStrategyKind {
        match self.strategy {
            JoinStrategyKind::Auto
                if left_rows >= self.sort_merge_min_rows
                    && right_rows >= self.sort_merge_min_rows =>
            {
                JoinStrategyKind::SortMerge
            }
            JoinStrategyKind::Auto => JoinStrategyKind::CrossProduct,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = JoinOptions::default();
        assert_eq!(opts.join_type, JoinType::Inner);
        assert!(!opts.allow_duplicate_column_names);
        assert!(!opts.keep_all_join_key_columns);
        assert!(!opts.missing_keys_match);
        assert_eq!(opts.sort_merge_min_rows, 4096);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let opts = JoinOptions::from_json(
            r#"{"join_type":"FULL_OUTER","strategy":"sort_merge","keep_all_join_key_columns":true}"#,
        )
        .unwrap();
        assert_eq!(opts.join_type, JoinType::FullOuter);
        assert_eq!(opts.strategy, JoinStrategyKind::SortMerge);
        assert!(opts.keep_all_join_key_columns);
        assert_eq!(opts.sort_merge_min_rows, DEFAULT_SORT_MERGE_MIN_ROWS);

        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(JoinOptions::from_json(&json).unwrap(), opts);
        assert!(JoinOptions::from_json("{\"join_type\":\"SIDEWAYS\"}").is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let opts = JoinOptions {
            sort_merge_min_rows: 0,
            ..JoinOptions::default()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.is_validation(), "case=zero_threshold err={err}");
    }

    #[test]
    fn auto_strategy_needs_both_sides_large() {
        let opts = JoinOptions {
            sort_merge_min_rows: 10,
            ..JoinOptions::default()
        };
        assert_eq!(opts.resolve_strategy(10, 10), JoinStrategyKind::SortMerge);
        assert_eq!(opts.resolve_strategy(10, 9), JoinStrategyKind::CrossProduct);
        let forced = opts.with_strategy(JoinStrategyKind::CrossProduct);
        assert_eq!(forced.resolve_strategy(100, 100), JoinStrategyKind::CrossProduct);
    }
}
