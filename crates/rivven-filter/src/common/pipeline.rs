//! # Filter Pipeline
//!
//! Drives one replication event at a time through the filter:
//!
//! ```text
//! SourceEvent::Query ──► pre-filter ──► DDL resolver ──► skip_statement ─┐
//!                                                                        ├──► FilterOutput
//! SourceEvent::Rows  ──────────────────────────────────► skip_row_event ─┘
//! ```
//!
//! Every event is evaluated against a single filter snapshot, so a
//! concurrent reload never splits the targets of one compound statement
//! across two configurations. Outputs are returned in the order the targets
//! appear in the event.
//!
//! ## Usage
//!
//! ```rust
//! use rivven_filter::{FilterConfig, FilterOutput, FilterPipeline, SourceEvent};
//!
//! let config = FilterConfig::builder().deny_table("stest", "log").build();
//! let pipeline = FilterPipeline::from_config(&config).unwrap();
//!
//! let outputs = pipeline
//!     .process(SourceEvent::query("", "drop table stest.log, stest.t"))
//!     .unwrap();
//! assert_eq!(outputs.len(), 1);
//! match &outputs[0] {
//!     FilterOutput::Statement { statement, .. } => {
//!         assert_eq!(statement.sql, "DROP TABLE `stest`.`t`");
//!     }
//!     FilterOutput::Row(_) => unreachable!(),
//! }
//! ```

use super::config::FilterConfig;
use super::event::{RowChange, SourceEvent};
use super::filter::{ReplicationFilter, SharedFilter};
use super::statement::NormalizedStatement;
use super::stats::{FilterStats, FilterStatsSnapshot};
use super::Result;
use crate::mysql::DdlResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// An item handed to the downstream applier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterOutput {
    /// A single-target DDL statement
    Statement {
        /// Default schema of the originating query event
        schema: String,
        /// The statement, with an unqualified target resolved against `schema`
        statement: NormalizedStatement,
    },
    /// A row change
    Row(RowChange),
}

impl FilterOutput {
    /// Target schema of this output.
    pub fn target_schema(&self) -> &str {
        match self {
            Self::Statement { statement, .. } => &statement.schema,
            Self::Row(row) => &row.schema,
        }
    }
}

/// Keep/skip verdict for one target of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub output: FilterOutput,
    pub skip: bool,
}

/// Applies the replication filter to a stream of source events.
#[derive(Debug)]
pub struct FilterPipeline {
    filter: SharedFilter,
    resolver: DdlResolver,
    stats: Arc<FilterStats>,
}

impl FilterPipeline {
    /// Create a pipeline around an already compiled filter.
    pub fn new(filter: ReplicationFilter) -> Self {
        Self {
            filter: SharedFilter::new(filter),
            resolver: DdlResolver::new(),
            stats: Arc::new(FilterStats::new()),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Ok(Self::new(ReplicationFilter::new(config)?))
    }

    /// The reloadable filter handle.
    pub fn filter(&self) -> &SharedFilter {
        &self.filter
    }

    /// Swap in a new configuration. Events already being evaluated finish
    /// against the previous one.
    pub fn reload(&self, config: &FilterConfig) -> Result<()> {
        self.filter.reload(config)
    }

    pub fn stats(&self) -> Arc<FilterStats> {
        Arc::clone(&self.stats)
    }

    pub fn stats_snapshot(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }

    /// Evaluate an event and return every target with its verdict.
    ///
    /// Pre-filtered and non-DDL query events yield no targets. A DDL
    /// statement that cannot be resolved fails the whole event.
    pub fn evaluate(&self, event: SourceEvent) -> Result<Vec<Decision>> {
        self.stats.record_event();
        let filter = self.filter.load();

        match event {
            SourceEvent::Query { schema, sql } => self.evaluate_query(&filter, schema, &sql),
            SourceEvent::Rows(row) => {
                let skip = filter.skip_row_event(&row);
                self.stats.record_row(skip);
                if skip {
                    debug!(
                        schema = %row.schema,
                        table = %row.table,
                        op = ?row.op,
                        "Skipping row event"
                    );
                }
                Ok(vec![Decision {
                    output: FilterOutput::Row(row),
                    skip,
                }])
            }
        }
    }

    fn evaluate_query(
        &self,
        filter: &ReplicationFilter,
        schema: String,
        sql: &str,
    ) -> Result<Vec<Decision>> {
        if filter.skip_query_event(sql, &schema) {
            trace!(schema = %schema, sql = %sql, "Query event pre-filtered");
            self.stats.record_prefiltered();
            return Ok(Vec::new());
        }

        let statements = match self.resolver.resolve(sql) {
            Ok(Some(statements)) => statements,
            Ok(None) => {
                trace!(schema = %schema, sql = %sql, "Query event is not DDL");
                self.stats.record_not_ddl();
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(schema = %schema, sql = %sql, error = %e, "Failed to resolve DDL");
                self.stats.record_parse_error();
                return Err(e);
            }
        };

        let decisions = statements
            .into_iter()
            .map(|statement| {
                let skip = filter.skip_statement(&statement, &schema);
                self.stats.record_statement(skip);
                let statement = statement.with_default_schema(&schema);
                if skip {
                    debug!(
                        kind = %statement.kind,
                        target = %statement.target(),
                        "Skipping DDL statement"
                    );
                }
                Decision {
                    output: FilterOutput::Statement {
                        schema: schema.clone(),
                        statement,
                    },
                    skip,
                }
            })
            .collect();
        Ok(decisions)
    }

    /// Process an event, returning only the targets to propagate.
    pub fn process(&self, event: SourceEvent) -> Result<Vec<FilterOutput>> {
        Ok(self
            .evaluate(event)?
            .into_iter()
            .filter(|d| !d.skip)
            .map(|d| d.output)
            .collect())
    }

    /// Process events in order, stopping at the first error.
    pub fn process_all(
        &self,
        events: impl IntoIterator<Item = SourceEvent>,
    ) -> Result<Vec<FilterOutput>> {
        let mut outputs = Vec::new();
        for event in events {
            outputs.extend(self.process(event)?);
        }
        Ok(outputs)
    }
}
