//! In-memory columnar tables and relational joins.
//!
//! This crate re-exports the coltab workspace: the column and table model
//! from `coltab-types`, reverse indexes from `coltab-index`, and the join
//! engine from `coltab-join`.
//!
//! ```
//! use coltab::prelude::*;
//!
//! let orders = Table::create("orders", vec![
//!     Column::integers("customer", [Some(1), Some(2), Some(2)]),
//!     Column::doubles("total", [Some(9.5), Some(3.0), Some(4.25)]),
//! ]).unwrap();
//! let customers = Table::create("customers", vec![
//!     Column::integers("customer", [Some(2), Some(3)]),
//!     Column::strings("name", [Some("bo"), Some("cy")]),
//! ]).unwrap();
//!
//! let opts = JoinOptions::new(JoinType::FullOuter);
//! let joined = join(&orders, &customers, &["customer"], &["customer"], &opts).unwrap();
//! assert_eq!(joined.row_count(), 4);
//! assert_eq!(joined.column_names(), vec!["customer", "total", "name"]);
//! ```

pub use coltab_error::{ColtabError, Result};
pub use coltab_index::ReverseIndex;
pub use coltab_join::{
    JoinKey, JoinMetricsSnapshot, JoinOptions, JoinStrategyKind, JoinType, Joiner, MergeScan,
    MergeState, RowComparatorChain, join, join_metrics_snapshot, reset_join_metrics,
};
pub use coltab_types::{
    Column, ColumnData, ColumnType, Representation, Selection, Table, Value, packed,
};

/// Glob-importable set of the commonly used names.
pub mod prelude {
    pub use crate::{
        Column, ColumnType, ColtabError, JoinOptions, JoinStrategyKind, JoinType, Joiner,
        Selection, Table, Value, join,
    };
}
