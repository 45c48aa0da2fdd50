//! Schema and table filtering for replication events
//!
//! Decides, per target, whether a normalized DDL statement or a row event is
//! propagated downstream.
//!
//! - System schemas are always skipped.
//! - If any allow-list is configured, it is the only source of truth: a target
//!   passes iff it is allowed, and deny-lists are ignored.
//! - Otherwise the deny-lists govern: a target passes unless denied.
//!
//! Schema-level statements (CREATE/DROP/ALTER DATABASE) are treated
//! asymmetrically so a downstream replica stays structurally consistent:
//!
//! - In allow mode a schema passes when any table rule references it, so the
//!   replica can create the schema before replaying its allowed tables.
//! - In deny mode a schema is skipped when any table deny rule references it,
//!   even if some of its tables still pass at the table level.
//!
//! # Example
//!
//! ```rust
//! use rivven_filter::{FilterConfig, ReplicationFilter};
//!
//! let config = FilterConfig::builder()
//!     .allow_schema("t2")
//!     .allow_table("stest", "log")
//!     .allow_table("stest", "~^t.*")
//!     .build();
//! let filter = ReplicationFilter::new(&config).unwrap();
//!
//! assert!(!filter.skip_table("stest", "t"));
//! assert!(filter.skip_table("stest", "log2"));
//! assert!(!filter.skip_table("t2", "anything"));
//! assert!(!filter.skip_schema("stest"));
//! assert!(filter.skip_schema("mysql"));
//! ```

use super::config::FilterConfig;
use super::event::RowChange;
use super::rules::{is_system_schema, RuleSet};
use super::statement::NormalizedStatement;
use super::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Compiled filter for efficient runtime evaluation
#[derive(Debug, Clone, Default)]
pub struct ReplicationFilter {
    rules: RuleSet,
}

impl ReplicationFilter {
    /// Create a new filter from configuration
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let rules = RuleSet::from_config(config)?;
        info!(
            schema_allow = rules.schema_allow().len(),
            schema_deny = rules.schema_deny().len(),
            table_allow = rules.table_allow().len(),
            table_deny = rules.table_deny().len(),
            allow_mode = rules.is_allow_mode(),
            "Replication filter compiled"
        );
        Ok(Self { rules })
    }

    /// Wrap an already compiled rule set.
    pub fn from_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Check if a schema-level statement for `schema` should be skipped.
    pub fn skip_schema(&self, schema: &str) -> bool {
        if is_system_schema(schema) {
            return true;
        }

        let rules = &self.rules;
        if rules.is_allow_mode() {
            return !(rules.schema_allow().matches(schema)
                || rules.table_allow().references_schema(schema));
        }

        rules.schema_deny().matches(schema) || rules.table_deny().references_schema(schema)
    }

    /// Check if a table-level statement or row event for `schema.table`
    /// should be skipped.
    pub fn skip_table(&self, schema: &str, table: &str) -> bool {
        if is_system_schema(schema) {
            return true;
        }

        let rules = &self.rules;
        if rules.is_allow_mode() {
            // A schema-level allow covers every table in the schema.
            return !(rules.schema_allow().matches(schema)
                || rules.table_allow().matches(schema, table));
        }

        if !rules.table_deny().is_empty() {
            return rules.table_deny().matches(schema, table)
                || rules.schema_deny().matches(schema);
        }

        rules.schema_deny().matches(schema)
    }

    /// Check if a normalized statement should be skipped.
    ///
    /// `default_schema` is the originating event's schema; it applies when the
    /// statement did not qualify its target. A rename is kept only when both
    /// its source and its destination are kept.
    pub fn skip_statement(&self, statement: &NormalizedStatement, default_schema: &str) -> bool {
        let schema = statement.schema_or(default_schema);
        let skip = match &statement.table {
            None => self.skip_schema(schema),
            Some(table) => self.skip_table(schema, table),
        };
        if skip {
            return true;
        }

        match &statement.rename_to {
            Some(to) => {
                let to_schema = to.schema.as_deref().unwrap_or(default_schema);
                self.skip_table(to_schema, &to.name)
            }
            None => false,
        }
    }

    /// Check if a row event should be skipped.
    pub fn skip_row_event(&self, row: &RowChange) -> bool {
        self.skip_table(&row.schema, &row.table)
    }

    /// Check if a query event can be dropped before DDL resolution.
    pub fn skip_query_event(&self, sql: &str, schema: &str) -> bool {
        crate::mysql::skip_query_event(sql, schema)
    }
}

/// Thread-safe, reloadable filter handle.
///
/// Readers take a snapshot with [`SharedFilter::load`] and evaluate against it
/// without holding any lock. [`SharedFilter::reload`] compiles the new
/// configuration first and only then swaps the pointer, so a bad
/// configuration leaves the current filter in place.
#[derive(Debug, Default)]
pub struct SharedFilter {
    current: RwLock<Arc<ReplicationFilter>>,
}

impl SharedFilter {
    pub fn new(filter: ReplicationFilter) -> Self {
        Self {
            current: RwLock::new(Arc::new(filter)),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Ok(Self::new(ReplicationFilter::new(config)?))
    }

    /// Current filter snapshot.
    pub fn load(&self) -> Arc<ReplicationFilter> {
        self.current.read().clone()
    }

    /// Compile `config` and atomically replace the current filter.
    pub fn reload(&self, config: &FilterConfig) -> Result<()> {
        let filter = ReplicationFilter::new(config)?;
        self.replace(filter);
        info!("Replication filter reloaded");
        Ok(())
    }

    /// Replace the current filter, returning the previous one.
    pub fn replace(&self, filter: ReplicationFilter) -> Arc<ReplicationFilter> {
        std::mem::replace(&mut *self.current.write(), Arc::new(filter))
    }
}
