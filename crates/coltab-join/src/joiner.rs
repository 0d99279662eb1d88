//! Join entry points.
//!
//! [`join`] validates its inputs, builds the result schema, picks a
//! strategy, and runs it. [`Joiner`] is a fluent wrapper for the common
//! cases: joining on same-named key columns and folding several right
//! tables into one result.

use coltab_error::{ColtabError, Result};
use coltab_types::Table;

use crate::cross_product::cross_product_join;
use crate::instrumentation::{record_join, record_validation_failure};
use crate::join_type::JoinType;
use crate::key::JoinKey;
use crate::options::{JoinOptions, JoinStrategyKind};
use crate::plan::JoinPlan;
use crate::schema::{AliasSequence, SchemaOptions, build_schema};
use crate::sort_merge::sort_merge_join;

/// Join `left` and `right` on the named key columns.
///
/// Key names resolve exactly first, then ignoring ASCII case. The output
/// holds the left columns followed by the right columns, minus the
/// redundant key columns unless `keep_all_join_key_columns` is set.
///
/// # Errors
///
/// Validation errors (see [`ColtabError::is_validation`]) are raised before
/// any index or sorted copy is built; no partial result is returned.
pub fn join<L, R>(
    left: &Table,
    right: &Table,
    left_keys: &[L],
    right_keys: &[R],
    options: &JoinOptions,
) -> Result<Table>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let mut aliases = AliasSequence::new();
    join_with_alias(left, right, left_keys, right_keys, options, &aliases.next_alias())
}

fn join_with_alias<L, R>(
    left: &Table,
    right: &Table,
    left_keys: &[L],
    right_keys: &[R],
    options: &JoinOptions,
    alias: &str,
) -> Result<Table>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let validated = options.validate().and_then(|()| {
        let key = JoinKey::resolve(left, right, left_keys, right_keys)?;
        let schema = build_schema(
            left,
            right,
            &key,
            SchemaOptions {
                join_type: options.join_type,
                allow_duplicate_column_names: options.allow_duplicate_column_names,
                keep_all_join_key_columns: options.keep_all_join_key_columns,
            },
            alias,
        )?;
        Ok((key, schema))
    });
    let (key, schema) = match validated {
        Ok(v) => v,
        Err(err) => {
            record_validation_failure();
            tracing::warn!(
                left = left.name(),
                right = right.name(),
                error = %err,
                "join rejected"
            );
            return Err(err);
        }
    };

    let strategy = options.resolve_strategy(left.row_count(), right.row_count());
    let _span = tracing::debug_span!(
        "table_join",
        strategy = strategy.as_str(),
        join_type = %options.join_type,
        left_rows = left.row_count(),
        right_rows = right.row_count(),
        key_columns = key.len(),
        alias,
    )
    .entered();

    let plan = JoinPlan {
        left,
        right,
        key: &key,
        join_type: options.join_type,
        keep_all_join_key_columns: options.keep_all_join_key_columns,
        missing_keys_match: options.missing_keys_match,
    };
    let result = match strategy {
        JoinStrategyKind::SortMerge => sort_merge_join(&plan, schema)?,
        JoinStrategyKind::CrossProduct | JoinStrategyKind::Auto => {
            cross_product_join(&plan, schema)?
        }
    };

    record_join(strategy, result.row_count());
    tracing::info!(
        output_rows = result.row_count(),
        output_columns = result.column_count(),
        "join complete"
    );
    Ok(result)
}

/// Fluent join builder anchored on a left table.
///
/// ```
/// use coltab_join::{JoinType, Joiner};
/// use coltab_types::{Column, Table};
///
/// let people = Table::create("people", vec![
///     Column::integers("id", [Some(1), Some(2)]),
///     Column::strings("name", [Some("ann"), Some("bo")]),
/// ]).unwrap();
/// let pets = Table::create("pets", vec![
///     Column::integers("id", [Some(2)]),
///     Column::strings("pet", [Some("cat")]),
/// ]).unwrap();
///
/// let joined = Joiner::new(&people, ["id"]).left_outer(&pets).unwrap();
/// assert_eq!(joined.row_count(), 2);
/// assert_eq!(joined.column_names(), vec!["id", "name", "pet"]);
/// ```
#[derive(Debug, Clone)]
pub struct Joiner<'a> {
    table: &'a Table,
    keys: Vec<String>,
    options: JoinOptions,
}

impl<'a> Joiner<'a> {
    pub fn new<I, S>(table: &'a Table, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table,
            keys: keys.into_iter().map(Into::into).collect(),
            options: JoinOptions::default(),
        }
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: JoinOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn allow_duplicate_column_names(mut self, allow: bool) -> Self {
        self.options.allow_duplicate_column_names = allow;
        self
    }

    #[must_use]
    pub fn keep_all_join_key_columns(mut self, keep: bool) -> Self {
        self.options.keep_all_join_key_columns = keep;
        self
    }

    #[must_use]
    pub fn missing_keys_match(mut self, matches: bool) -> Self {
        self.options.missing_keys_match = matches;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: JoinStrategyKind) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// # Errors
    ///
    /// See [`join`].
    pub fn inner(&self, right: &Table) -> Result<Table> {
        self.on(right, &self.keys, JoinType::Inner)
    }

    /// # Errors
    ///
    /// See [`join`].
    pub fn left_outer(&self, right: &Table) -> Result<Table> {
        self.on(right, &self.keys, JoinType::LeftOuter)
    }

    /// # Errors
    ///
    /// See [`join`].
    pub fn right_outer(&self, right: &Table) -> Result<Table> {
        self.on(right, &self.keys, JoinType::RightOuter)
    }

    /// # Errors
    ///
    /// See [`join`].
    pub fn full_outer(&self, right: &Table) -> Result<Table> {
        self.on(right, &self.keys, JoinType::FullOuter)
    }

    /// Join on differently named right key columns.
    ///
    /// # Errors
    ///
    /// See [`join`].
    pub fn on<S: AsRef<str>>(
        &self,
        right: &Table,
        right_keys: &[S],
        join_type: JoinType,
    ) -> Result<Table> {
        let mut options = self.options.clone();
        options.join_type = join_type;
        join(self.table, right, &self.keys, right_keys, &options)
    }

    /// Join each table in `rights` in turn, using the same key names on
    /// every side. Aliases advance once per right table: `T2`, `T3`, ...
    ///
    /// # Errors
    ///
    /// Fails on the first join that fails, or with
    /// [`ColtabError::InvalidOptions`] when `rights` is empty.
    pub fn with(&self, rights: &[&Table], join_type: JoinType) -> Result<Table> {
        let Some((first, rest)) = rights.split_first() else {
            return Err(ColtabError::InvalidOptions(
                "multi-table join needs at least one right table".to_owned(),
            ));
        };
        let mut options = self.options.clone();
        options.join_type = join_type;
        let mut aliases = AliasSequence::new();
        let mut result = join_with_alias(
            self.table,
            first,
            &self.keys,
            &self.keys,
            &options,
            &aliases.next_alias(),
        )?;
        for right in rest {
            result = join_with_alias(
                &result,
                right,
                &self.keys,
                &self.keys,
                &options,
                &aliases.next_alias(),
            )?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltab_types::{Column, Value};

    fn table(name: &str, ids: &[i32], col: &str) -> Table {
        let values: Vec<Option<String>> = ids.iter().map(|i| Some(format!("{col}{i}"))).collect();
        Table::create(
            name,
            vec![
                Column::integers("id", ids.iter().map(|&i| Some(i))),
                Column::strings(col, values),
            ],
        )
        .unwrap()
    }

    #[test]
    fn validation_failures_leave_no_result() {
        let a = table("a", &[1], "x");
        let b = table("b", &[1], "x");
        let err = join(&a, &b, &["id"], &["id"], &JoinOptions::default()).unwrap_err();
        assert!(
            matches!(err, ColtabError::DuplicateColumnName { .. }),
            "case=duplicate_non_key err={err}"
        );
        let bad = JoinOptions {
            sort_merge_min_rows: 0,
            ..JoinOptions::default()
        };
        assert!(matches!(
            join(&a, &b, &["id"], &["id"], &bad),
            Err(ColtabError::InvalidOptions(_))
        ));
    }

    #[test]
    fn strategies_agree_on_small_inputs() {
        let a = table("a", &[1, 2, 2, 4], "x");
        let b = table("b", &[2, 4, 4, 5], "y");
        for join_type in JoinType::ALL {
            let mut rows = Vec::new();
            for strategy in [JoinStrategyKind::CrossProduct, JoinStrategyKind::SortMerge] {
                let opts = JoinOptions::new(join_type).with_strategy(strategy);
                let t = join(&a, &b, &["id"], &["id"], &opts).unwrap();
                let mut set: Vec<String> = (0..t.row_count())
                    .map(|r| format!("{:?}", t.row_values(r).unwrap()))
                    .collect();
                set.sort();
                rows.push(set);
            }
            assert_eq!(rows[0], rows[1], "case=equivalence join_type={join_type}");
        }
    }

    #[test]
    fn multi_table_aliases_advance_per_table() {
        let a = table("a", &[1, 2], "v");
        let b = table("b", &[1, 2], "v");
        let c = table("c", &[2], "v");
        let t = Joiner::new(&a, ["id"])
            .allow_duplicate_column_names(true)
            .with(&[&b, &c], JoinType::Inner)
            .unwrap();
        assert_eq!(t.column_names(), vec!["id", "v", "T2.v", "T3.v"]);
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.row_values(0).unwrap()[3], Value::from("v2"));
    }

    #[test]
    fn with_requires_a_right_table() {
        let a = table("a", &[1], "v");
        assert!(Joiner::new(&a, ["id"]).with(&[], JoinType::Inner).is_err());
    }

    #[test]
    fn on_joins_differently_named_keys() {
        let a = table("a", &[1, 2], "v");
        let b = Table::create(
            "b",
            vec![
                Column::integers("other_id", [Some(2)]),
                Column::doubles("w", [Some(0.5)]),
            ],
        )
        .unwrap();
        let t = Joiner::new(&a, ["id"]).on(&b, &["other_id"], JoinType::Inner).unwrap();
        assert_eq!(t.column_names(), vec!["id", "v", "w"]);
        assert_eq!(t.row_values(0).unwrap()[2], Value::Double(0.5));
    }
}
