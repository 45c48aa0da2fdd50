//! # rivven-filter - Replication Filtering for Rivven
//!
//! Schema/table filtering and DDL normalization for MySQL-style binlog
//! replication.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            Binlog transport (SourceEvent)                │
//! └──────────────────────────────────────────────────────────┘
//!       │ Query { schema, sql }             │ Rows(RowChange)
//!       ▼                                   │
//! ┌───────────┐   ┌───────────┐             │
//! │Pre-filter │──►│DdlResolver│             │
//! └───────────┘   └─────┬─────┘             │
//!                       │ statements        │
//!                       ▼                   ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │     ReplicationFilter (allow / deny, schema / table)     │
//! └──────────────────────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │          FilterOutput::Statement / ::Row → applier       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rivven_filter::{FilterConfig, FilterPipeline, SourceEvent};
//!
//! # fn example() -> rivven_filter::Result<()> {
//! let config = FilterConfig::from_yaml_str(
//!     r#"
//! do_db: ["t2"]
//! do_table:
//!   - { schema: stest, table: log }
//!   - { schema: stest, table: "~^t.*" }
//! "#,
//! )?;
//!
//! let pipeline = FilterPipeline::from_config(&config)?;
//! let kept = pipeline.process(SourceEvent::query("", "create table stest.log2(id int)"))?;
//! assert!(kept.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Public API Organization
//!
//! ### Tier 1: Core Types (crate root)
//! Configuration, the filter, the pipeline and the event/statement types.
//!
//! ### Tier 2: Advanced Types (`common` and `mysql` modules)
//! Compiled rules, pattern matchers, the DDL resolver and the pre-filter.

pub mod common;

pub mod mysql;

// =============================================================================
// TIER 1: Core Types
// =============================================================================

pub use common::{
    // Error handling
    ErrorCategory,
    FilterError,
    Result,
    // Configuration
    FilterConfig,
    FilterConfigBuilder,
    TablePattern,
    // Decisions
    ReplicationFilter,
    SharedFilter,
    // Events and statements
    DdlKind,
    NormalizedStatement,
    RowChange,
    RowOp,
    SourceEvent,
    TableRef,
    // Pipeline
    Decision,
    FilterOutput,
    FilterPipeline,
    FilterStats,
    FilterStatsSnapshot,
};

// =============================================================================
// TIER 2: Advanced Types - Available via `common::` and `mysql::`
// =============================================================================
// Not re-exported at the crate root:
//
//   - common::RuleSet, TableRule, TableRuleList, is_system_schema
//   - common::pattern::PatternMatcher, PatternSet
//   - mysql::DdlResolver, resolve_ddl
//   - mysql::skip_query_event
