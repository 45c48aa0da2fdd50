//! Filter pipeline counters
//!
//! Lock-free counters updated on the hot path. They are informational only
//! and never influence a decision.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for filtered replication events.
#[derive(Debug, Default)]
pub struct FilterStats {
    /// Events handed to the pipeline
    pub events_seen: AtomicU64,
    /// Query events dropped by the pre-filter
    pub queries_prefiltered: AtomicU64,
    /// Query events that were not DDL
    pub queries_not_ddl: AtomicU64,
    /// Normalized statements passed downstream
    pub statements_kept: AtomicU64,
    /// Normalized statements filtered out
    pub statements_skipped: AtomicU64,
    /// Row events passed downstream
    pub rows_kept: AtomicU64,
    /// Row events filtered out
    pub rows_skipped: AtomicU64,
    /// DDL statements that failed to resolve
    pub parse_errors: AtomicU64,
}

impl FilterStats {
    /// Create new statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&self) {
        self.events_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefiltered(&self) {
        self.queries_prefiltered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_ddl(&self) {
        self.queries_not_ddl.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the decision for one normalized statement.
    pub fn record_statement(&self, skipped: bool) {
        if skipped {
            self.statements_skipped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.statements_kept.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record the decision for one row event.
    pub fn record_row(&self, skipped: bool) {
        if skipped {
            self.rows_skipped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rows_kept.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of statistics.
    pub fn snapshot(&self) -> FilterStatsSnapshot {
        FilterStatsSnapshot {
            events_seen: self.events_seen.load(Ordering::Relaxed),
            queries_prefiltered: self.queries_prefiltered.load(Ordering::Relaxed),
            queries_not_ddl: self.queries_not_ddl.load(Ordering::Relaxed),
            statements_kept: self.statements_kept.load(Ordering::Relaxed),
            statements_skipped: self.statements_skipped.load(Ordering::Relaxed),
            rows_kept: self.rows_kept.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of filter statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStatsSnapshot {
    pub events_seen: u64,
    pub queries_prefiltered: u64,
    pub queries_not_ddl: u64,
    pub statements_kept: u64,
    pub statements_skipped: u64,
    pub rows_kept: u64,
    pub rows_skipped: u64,
    pub parse_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let stats = FilterStats::new();
        stats.record_event();
        stats.record_event();
        stats.record_prefiltered();
        stats.record_statement(true);
        stats.record_statement(false);
        stats.record_statement(false);
        stats.record_row(true);
        stats.record_parse_error();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.events_seen, 2);
        assert_eq!(snapshot.queries_prefiltered, 1);
        assert_eq!(snapshot.statements_kept, 2);
        assert_eq!(snapshot.statements_skipped, 1);
        assert_eq!(snapshot.rows_skipped, 1);
        assert_eq!(snapshot.rows_kept, 0);
        assert_eq!(snapshot.parse_errors, 1);
        assert_eq!(snapshot.queries_not_ddl, 0);
    }
}
