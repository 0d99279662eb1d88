//! Join observability counters.
//!
//! Process-local counters read by the `table_join` tracing lane and by
//! tests. Each join call adds to them; nothing resets them except
//! [`reset_join_metrics`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::options::JoinStrategyKind;

/// Snapshot of per-strategy join counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinStrategyTotals {
    pub cross_product: u64,
    pub sort_merge: u64,
}

/// Snapshot of join observability metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinMetricsSnapshot {
    /// Completed joins by strategy.
    pub coltab_joins_total: JoinStrategyTotals,
    /// Joins rejected during validation.
    pub coltab_join_validation_failures_total: u64,
    /// Rows written to join results.
    pub coltab_join_output_rows_total: u64,
    /// Reverse-index probes made by the cross-product strategy.
    pub coltab_index_lookups_total: u64,
    /// Times a sort-merge scan rewound to its mark for a duplicate left key.
    pub coltab_merge_group_replays_total: u64,
    /// Missing-padded rows emitted for outer joins.
    pub coltab_unmatched_rows_total: u64,
}

static JOINS_CROSS_PRODUCT_TOTAL: AtomicU64 = AtomicU64::new(0);
static JOINS_SORT_MERGE_TOTAL: AtomicU64 = AtomicU64::new(0);
static VALIDATION_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);
static OUTPUT_ROWS_TOTAL: AtomicU64 = AtomicU64::new(0);
static INDEX_LOOKUPS_TOTAL: AtomicU64 = AtomicU64::new(0);
static MERGE_GROUP_REPLAYS_TOTAL: AtomicU64 = AtomicU64::new(0);
static UNMATCHED_ROWS_TOTAL: AtomicU64 = AtomicU64::new(0);

fn saturating(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

pub(crate) fn record_join(strategy: JoinStrategyKind, output_rows: usize) {
    let counter = match strategy {
        JoinStrategyKind::SortMerge => &JOINS_SORT_MERGE_TOTAL,
        JoinStrategyKind::CrossProduct | JoinStrategyKind::Auto => &JOINS_CROSS_PRODUCT_TOTAL,
    };
    counter.fetch_add(1, Ordering::Relaxed);
    OUTPUT_ROWS_TOTAL.fetch_add(saturating(output_rows), Ordering::Relaxed);
}

pub(crate) fn record_validation_failure() {
    VALIDATION_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_index_lookups(count: usize) {
    INDEX_LOOKUPS_TOTAL.fetch_add(saturating(count), Ordering::Relaxed);
}

pub(crate) fn record_group_replays(count: usize) {
    MERGE_GROUP_REPLAYS_TOTAL.fetch_add(saturating(count), Ordering::Relaxed);
}

pub(crate) fn record_unmatched_rows(count: usize) {
    UNMATCHED_ROWS_TOTAL.fetch_add(saturating(count), Ordering::Relaxed);
}

/// Return a snapshot of join counters.
#[must_use]
pub fn join_metrics_snapshot() -> JoinMetricsSnapshot {
    JoinMetricsSnapshot {
        coltab_joins_total: JoinStrategyTotals {
            cross_product: JOINS_CROSS_PRODUCT_TOTAL.load(Ordering::Relaxed),
            sort_merge: JOINS_SORT_MERGE_TOTAL.load(Ordering::Relaxed),
        },
        coltab_join_validation_failures_total: VALIDATION_FAILURES_TOTAL.load(Ordering::Relaxed),
        coltab_join_output_rows_total: OUTPUT_ROWS_TOTAL.load(Ordering::Relaxed),
        coltab_index_lookups_total: INDEX_LOOKUPS_TOTAL.load(Ordering::Relaxed),
        coltab_merge_group_replays_total: MERGE_GROUP_REPLAYS_TOTAL.load(Ordering::Relaxed),
        coltab_unmatched_rows_total: UNMATCHED_ROWS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset all join counters.
pub fn reset_join_metrics() {
    JOINS_CROSS_PRODUCT_TOTAL.store(0, Ordering::Relaxed);
    JOINS_SORT_MERGE_TOTAL.store(0, Ordering::Relaxed);
    VALIDATION_FAILURES_TOTAL.store(0, Ordering::Relaxed);
    OUTPUT_ROWS_TOTAL.store(0, Ordering::Relaxed);
    INDEX_LOOKUPS_TOTAL.store(0, Ordering::Relaxed);
    MERGE_GROUP_REPLAYS_TOTAL.store(0, Ordering::Relaxed);
    UNMATCHED_ROWS_TOTAL.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tracks_strategy_buckets() {
        let before = join_metrics_snapshot();
        record_join(JoinStrategyKind::SortMerge, 3);
        record_join(JoinStrategyKind::CrossProduct, 2);
        record_unmatched_rows(1);

        let after = join_metrics_snapshot();
        assert!(
            after.coltab_joins_total.sort_merge >= before.coltab_joins_total.sort_merge + 1,
            "case=sort_merge_bucket"
        );
        assert!(
            after.coltab_joins_total.cross_product >= before.coltab_joins_total.cross_product + 1,
            "case=cross_product_bucket"
        );
        assert!(after.coltab_join_output_rows_total >= before.coltab_join_output_rows_total + 5);
        assert!(after.coltab_unmatched_rows_total > before.coltab_unmatched_rows_total);
    }
}
