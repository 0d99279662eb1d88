//! Relational joins over coltab tables.
//!
//! Two strategies produce the same rows from different algorithms:
//!
//! - [`cross_product`]: per-column reverse indexes, intersected to find each
//!   key group, with the Cartesian product of matching rows written out.
//! - [`sort_merge`]: stable sort of both inputs followed by a merge scan that
//!   replays duplicate key groups from a mark.
//!
//! [`join`] and [`Joiner`] validate inputs, build the result schema, and
//! choose a strategy according to [`JoinOptions`].

pub mod comparator;
pub mod cross_product;
pub mod instrumentation;
pub mod join_type;
pub mod joiner;
pub mod key;
pub mod options;
mod output;
pub mod plan;
pub mod schema;
pub mod sort_merge;

pub use comparator::RowComparatorChain;
pub use instrumentation::{JoinMetricsSnapshot, join_metrics_snapshot, reset_join_metrics};
pub use join_type::JoinType;
pub use joiner::{Joiner, join};
pub use key::{JoinKey, KeyPair};
pub use options::{DEFAULT_SORT_MERGE_MIN_ROWS, JoinOptions, JoinStrategyKind};
pub use plan::JoinPlan;
pub use schema::{AliasSequence, ResultSchema, SchemaOptions, build_schema};
pub use sort_merge::{MergeScan, MergeState};
